// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR SIGWINCH epoll sigaction signalfd

//! Core [`EventBridgeThread`] struct and lifecycle methods.

use crate::{DEBUG_GATEWAY_SHOW_INTERNALS,
            backend::CursesEventSource,
            bridge::{Continuation,
                     handler_input::consume_input_readiness,
                     handler_signals::consume_pending_signals,
                     sources::SourceKind},
            gateway::op::GatewayRequest};
use mio::{Events, Interest, Poll, Token, Waker, unix::SourceFd};
use signal_hook::consts::SIGWINCH;
use signal_hook_mio::v1_0::Signals;
use std::{io::ErrorKind,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering},
                 mpsc::Sender},
          thread::JoinHandle};

/// Capacity for the [`mio::Events`] buffer.
const EVENTS_CAPACITY: usize = 8;

/// Executor-side handle to a running bridge thread.
///
/// Held by the gateway executor while a session is active. [`shutdown`] is called
/// by finalize *before* the native finalize runs, guaranteeing nothing reads the
/// input stream while the native library swaps it back.
///
/// [`shutdown`]: BridgeHandle::shutdown
#[derive(Debug)]
pub(crate) struct BridgeHandle {
    waker: Arc<Waker>,
    stop_requested: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    /// Requests the bridge thread to stop and blocks until it has exited.
    pub(crate) fn shutdown(mut self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        let _unused = self.waker.wake();
        if let Some(join) = self.join.take() {
            let _unused = join.join();
        }
    }
}

/// The bridge's event loop state: poll handle, registered sources, and the
/// channel back to the gateway executor.
#[allow(missing_debug_implementations)]
pub(crate) struct EventBridgeThread<S: CursesEventSource> {
    /// [`mio`] poll instance waiting on the input fd, `SIGWINCH`, and the waker.
    poll_handle: Poll,
    /// Buffer for events returned by [`Poll::poll()`].
    ready_events_buffer: Events,
    /// `SIGWINCH` adapter — an internal pipe that becomes readable on delivery,
    /// so signal work always runs on this thread, never in signal context.
    signals: Signals,
    /// The read side of the native input stream, owned exclusively here.
    event_source: S,
    /// Fire-and-forget delivery channel into the gateway executor.
    deliver_tx: Sender<GatewayRequest>,
    /// Set by [`BridgeHandle::shutdown`] before waking the poll.
    stop_requested: Arc<AtomicBool>,
}

impl<S: CursesEventSource> EventBridgeThread<S> {
    /// Registers all sources and spawns the bridge thread.
    ///
    /// Any registration or spawn failure is returned to the caller — the
    /// `initialize` operation surfaces it as a `BridgeStartup` error instead of
    /// silently running without event delivery.
    pub(crate) fn spawn(
        event_source: S,
        deliver_tx: Sender<GatewayRequest>,
    ) -> std::io::Result<BridgeHandle> {
        let poll_handle = Poll::new()?;
        let registry = poll_handle.registry();

        let input_fd = event_source.as_raw_fd();
        registry.register(
            &mut SourceFd(&input_fd),
            SourceKind::Input.to_token(),
            Interest::READABLE,
        )?;

        let mut signals = Signals::new([SIGWINCH])?;
        registry.register(
            &mut signals,
            SourceKind::Signals.to_token(),
            Interest::READABLE,
        )?;

        let waker = Arc::new(Waker::new(
            registry,
            SourceKind::ShutdownWaker.to_token(),
        )?);
        let stop_requested = Arc::new(AtomicBool::new(false));

        let mut bridge = Self {
            poll_handle,
            ready_events_buffer: Events::with_capacity(EVENTS_CAPACITY),
            signals,
            event_source,
            deliver_tx,
            stop_requested: stop_requested.clone(),
        };

        let join = std::thread::Builder::new()
            .name("curses-event-bridge".into())
            .spawn(move || bridge.run())?;

        DEBUG_GATEWAY_SHOW_INTERNALS.then(|| {
            tracing::debug!(message = "event-bridge: started with mio::Poll");
        });

        Ok(BridgeHandle {
            waker,
            stop_requested,
            join: Some(join),
        })
    }

    /// Runs the main event loop until shutdown is requested or delivery fails.
    ///
    /// Blocks on [`Poll::poll()`] with no timeout — the thread consumes no CPU
    /// while nothing is ready. `EINTR` is retried; any other poll error ends
    /// event delivery for this session.
    fn run(&mut self) {
        // Breaks the borrow so dispatch can use `&mut self`.
        fn collect_ready_tokens(events: &Events) -> Vec<Token> {
            events.iter().map(mio::event::Event::token).collect()
        }

        loop {
            let poll_result = self.poll_handle.poll(&mut self.ready_events_buffer, None);

            if let Err(err) = poll_result {
                // EINTR - retry.
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                tracing::error!(
                    message = "event-bridge: poll error, stopping delivery",
                    error = ?err
                );
                return;
            }

            for token in collect_ready_tokens(&self.ready_events_buffer) {
                if self.dispatch(token) == Continuation::Stop {
                    DEBUG_GATEWAY_SHOW_INTERNALS.then(|| {
                        tracing::debug!(message = "event-bridge: exiting");
                    });
                    return;
                }
            }
        }
    }

    /// Routes one ready token to its handler.
    fn dispatch(&mut self, token: Token) -> Continuation {
        match SourceKind::from_token(token) {
            SourceKind::Input => {
                consume_input_readiness(&mut self.event_source, &self.deliver_tx)
            }
            SourceKind::Signals => consume_pending_signals(
                &mut self.signals,
                &mut self.event_source,
                &self.deliver_tx,
            ),
            SourceKind::ShutdownWaker => {
                if self.stop_requested.load(Ordering::SeqCst) {
                    Continuation::Stop
                } else {
                    Continuation::Continue
                }
            }
            SourceKind::Unknown => {
                tracing::warn!(
                    message = "event-bridge: unknown token",
                    token = ?token
                );
                Continuation::Continue
            }
        }
    }
}
