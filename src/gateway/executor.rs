// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The gateway executor thread: the single serialization point.
//!
//! One dedicated [`std::thread`] owns the [`CursesBackend`] and all gateway
//! state, and handles requests one at a time in channel order. The mutual
//! exclusion invariant is structural: nothing outside this thread holds a
//! reference to the backend, so operation N+1 cannot begin against the native
//! library before operation N has returned — no lock, no lock ordering, no
//! recursive-deadlock hazard.
//!
//! The bridge thread participates through the same channel: its
//! [`GatewayRequest::Deliver`] messages mutate the subscriber slot only from this
//! thread, so subscribe/unsubscribe and delivery are serialized against each
//! other for free.

use crate::{DEBUG_GATEWAY_SHOW_INTERNALS,
            backend::{CursesBackend, InitArgs, NativeArg, NativeCall, NativeReply,
                      RawWindow},
            bridge::{BridgeHandle, Continuation, EventBridgeThread},
            gateway::{error::{GatewayError, GatewayResult},
                      op::{GatewayRequest, OpReply, SubscriptionId, TerminalOp,
                           WindowId}},
            key_code::KeyEvent};
use std::{collections::HashMap,
          sync::mpsc::{Receiver, Sender, channel}};

/// Lifecycle of the native session owned by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Active,
}

/// The single live event subscription, if any.
#[derive(Debug)]
struct Subscription {
    id: SubscriptionId,
    tx: Sender<KeyEvent>,
}

pub(crate) struct GatewayExecutor<B: CursesBackend> {
    backend: B,
    phase: Phase,
    /// Gateway-issued window ids → native raw handles. Cleared on finalize.
    windows: HashMap<WindowId, RawWindow>,
    next_window_id: u64,
    subscriber: Option<Subscription>,
    next_subscription_id: u64,
    bridge: Option<BridgeHandle>,
    rx: Receiver<GatewayRequest>,
    /// Clone handed to the bridge thread at initialize so deliveries flow
    /// through the same serialized queue as every other request.
    deliver_tx: Sender<GatewayRequest>,
}

impl<B: CursesBackend> GatewayExecutor<B> {
    /// Spawns the executor thread and returns the request channel.
    ///
    /// # Panics
    ///
    /// Panics if thread spawning fails.
    pub(crate) fn spawn(backend: B) -> Sender<GatewayRequest> {
        let (tx, rx) = channel();
        let executor = Self {
            backend,
            phase: Phase::Uninitialized,
            windows: HashMap::new(),
            next_window_id: 1,
            subscriber: None,
            next_subscription_id: 1,
            bridge: None,
            rx,
            deliver_tx: tx.clone(),
        };
        let _unused = std::thread::Builder::new()
            .name("curses-gateway-executor".into())
            .spawn(move || executor.run())
            .expect(
                "Failed to spawn gateway executor thread: OS denied thread \
                 creation. Check ulimit -u (max user processes) or available memory.",
            );
        tx
    }

    /// Handles requests until shutdown, then tears down any live session.
    fn run(mut self) {
        while let Ok(request) = self.rx.recv() {
            if self.handle(request) == Continuation::Stop {
                break;
            }
        }
        if self.phase == Phase::Active {
            if let Err(err) = self.teardown() {
                tracing::error!(
                    message = "gateway: teardown on shutdown failed",
                    error = %err
                );
            }
        }
    }

    fn handle(&mut self, request: GatewayRequest) -> Continuation {
        match request {
            GatewayRequest::Initialize { args, reply } => {
                let _unused = reply.send(self.initialize(&args));
            }
            GatewayRequest::Finalize { reply } => {
                let _unused = reply.send(self.finalize());
            }
            GatewayRequest::Execute { op, reply } => {
                let _unused = reply.send(self.execute(&op));
            }
            GatewayRequest::Subscribe { tx, reply } => {
                let _unused = reply.send(self.subscribe(tx));
            }
            GatewayRequest::Unsubscribe { id, reply } => {
                let _unused = reply.send(self.unsubscribe(id));
            }
            GatewayRequest::Deliver(key) => self.deliver(key),
            GatewayRequest::Shutdown => return Continuation::Stop,
        }
        Continuation::Continue
    }

    fn initialize(&mut self, args: &InitArgs) -> GatewayResult<()> {
        if self.phase == Phase::Active {
            return Err(GatewayError::AlreadyInitialized);
        }

        let outcome = self
            .backend
            .initialize(args)
            .map_err(|source| GatewayError::NativeCall {
                name: "initscr",
                source,
            })?;

        // The native init sequence swaps the process input stream. The bridge is
        // spawned only after that call has returned, so nothing watches the
        // stream during the swap.
        match EventBridgeThread::spawn(outcome.event_source, self.deliver_tx.clone()) {
            Ok(bridge) => {
                self.bridge = Some(bridge);
                self.windows.insert(WindowId::ROOT, outcome.root_window);
                self.next_window_id = 1;
                self.phase = Phase::Active;
                Ok(())
            }
            Err(err) => {
                // Roll back: a session without event delivery is not usable.
                if let Err(native_err) = self.backend.finalize() {
                    tracing::error!(
                        message = "gateway: rollback finalize failed",
                        error = %native_err
                    );
                }
                Err(GatewayError::BridgeStartup(err))
            }
        }
    }

    fn finalize(&mut self) -> GatewayResult<()> {
        if self.phase != Phase::Active {
            return Err(GatewayError::NotInitialized);
        }
        self.teardown()
    }

    fn teardown(&mut self) -> GatewayResult<()> {
        // Stop and join the bridge first: the native finalize swaps the input
        // stream back, and nothing may be reading it when that happens.
        if let Some(bridge) = self.bridge.take() {
            bridge.shutdown();
        }
        self.windows.clear();
        self.subscriber = None;
        self.phase = Phase::Uninitialized;
        self.backend
            .finalize()
            .map_err(|source| GatewayError::NativeCall {
                name: "endwin",
                source,
            })
    }

    fn execute(&mut self, op: &TerminalOp) -> GatewayResult<OpReply> {
        if self.phase != Phase::Active {
            return Err(GatewayError::NotInitialized);
        }

        let raw_window = match op.window() {
            Some(id) => Some(
                *self
                    .windows
                    .get(&id)
                    .ok_or(GatewayError::InvalidHandle(id))?,
            ),
            None => None,
        };

        let call = build_native_call(op, raw_window);
        let reply = self
            .backend
            .invoke(&call)
            .map_err(|source| GatewayError::NativeCall {
                name: op.name(),
                source,
            })?;

        self.shape_reply(op, reply)
    }

    /// Shapes the raw native reply into the typed [`OpReply`] this operation
    /// produces, registering/releasing window handles as a side effect.
    fn shape_reply(
        &mut self,
        op: &TerminalOp,
        reply: NativeReply,
    ) -> GatewayResult<OpReply> {
        match op {
            TerminalOp::CreateWindow { .. } => match reply {
                NativeReply::Window(raw) => {
                    let id = WindowId(self.next_window_id);
                    self.next_window_id += 1;
                    self.windows.insert(id, raw);
                    Ok(OpReply::Window(id))
                }
                _ => Err(GatewayError::ReplyShape { name: op.name() }),
            },
            TerminalOp::DestroyWindow { window } => {
                self.windows.remove(window);
                Ok(OpReply::Unit)
            }
            TerminalOp::QueryGeometry { .. } | TerminalOp::CursorPosition { .. } => {
                match reply {
                    NativeReply::Pair(a, b) => {
                        let shape_err = || GatewayError::ReplyShape { name: op.name() };
                        let first = u16::try_from(a).map_err(|_| shape_err())?;
                        let second = u16::try_from(b).map_err(|_| shape_err())?;
                        Ok(OpReply::Pair(first, second))
                    }
                    _ => Err(GatewayError::ReplyShape { name: op.name() }),
                }
            }
            _ => match reply {
                NativeReply::Unit => Ok(OpReply::Unit),
                NativeReply::Bool(value) => Ok(OpReply::Bool(value)),
                NativeReply::Int(value) => Ok(OpReply::Int(value)),
                NativeReply::Window(_) | NativeReply::Pair(..) => {
                    Err(GatewayError::ReplyShape { name: op.name() })
                }
            },
        }
    }

    fn subscribe(&mut self, tx: Sender<KeyEvent>) -> GatewayResult<SubscriptionId> {
        if self.phase != Phase::Active {
            return Err(GatewayError::NotInitialized);
        }
        if self.subscriber.is_some() {
            // Reject, never replace: replacing would silently steal another
            // consumer's pending wait.
            return Err(GatewayError::SubscriberBusy);
        }
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscriber = Some(Subscription { id, tx });
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> GatewayResult<()> {
        if self.phase != Phase::Active {
            return Err(GatewayError::NotInitialized);
        }
        match &self.subscriber {
            Some(subscription) if subscription.id == id => {
                self.subscriber = None;
                Ok(())
            }
            _ => Err(GatewayError::StaleSubscription),
        }
    }

    /// At-most-once, best-effort delivery: no subscriber means the event is
    /// dropped, never queued for later.
    fn deliver(&mut self, key: KeyEvent) {
        let Some(subscription) = &self.subscriber else {
            DEBUG_GATEWAY_SHOW_INTERNALS.then(|| {
                tracing::debug!(
                    message = "gateway: event dropped, no subscriber",
                    key = ?key
                );
            });
            return;
        };
        if subscription.tx.send(key).is_err() {
            // The subscriber's receiver is gone; free the slot.
            self.subscriber = None;
        }
    }
}

/// Marshals one typed operation into a positional native call.
fn build_native_call(op: &TerminalOp, raw_window: Option<RawWindow>) -> NativeCall {
    let mut call = NativeCall::new(op.name());
    if let Some(raw) = raw_window {
        call = call.arg(NativeArg::Window(raw));
    }
    match op {
        TerminalOp::CreateWindow {
            rows,
            cols,
            row,
            col,
        } => call
            .arg(NativeArg::Int(i64::from(*rows)))
            .arg(NativeArg::Int(i64::from(*cols)))
            .arg(NativeArg::Int(i64::from(*row)))
            .arg(NativeArg::Int(i64::from(*col))),
        TerminalOp::MoveCursor { row, col, .. } => call
            .arg(NativeArg::Int(i64::from(*row)))
            .arg(NativeArg::Int(i64::from(*col))),
        TerminalOp::ResizeWindow { rows, cols, .. } => call
            .arg(NativeArg::Int(i64::from(*rows)))
            .arg(NativeArg::Int(i64::from(*cols))),
        TerminalOp::SetAttributes { mask, .. } => {
            call.arg(NativeArg::Int(i64::from(mask.0)))
        }
        TerminalOp::AddString { text, .. } => call.arg(NativeArg::Str(text.clone())),
        TerminalOp::DestroyWindow { .. }
        | TerminalOp::RefreshWindow { .. }
        | TerminalOp::QueryGeometry { .. }
        | TerminalOp::CursorPosition { .. }
        | TerminalOp::SetEcho { .. }
        | TerminalOp::Beep => call,
    }
}
