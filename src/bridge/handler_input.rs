// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR

//! Handler for readiness on the native input stream.

use crate::{DEBUG_GATEWAY_SHOW_INTERNALS,
            backend::CursesEventSource,
            bridge::Continuation,
            gateway::op::GatewayRequest,
            key_code::{KEY_RESIZE, KeyEvent}};
use std::{io::ErrorKind, sync::mpsc::Sender};

/// Reads every pending input event and forwards each to the executor.
///
/// Readiness notifications from [`mio`] are edge-style: two keys arriving between
/// wakeups coalesce into one notification, so stopping after a single read could
/// strand a queued event until the next edge. Each individual read is still a
/// discrete, non-blocking call that readiness has confirmed will not block.
///
/// The raw resize key ([`KEY_RESIZE`]) is suppressed here: the native library's
/// own `SIGWINCH` handler enqueued it, and the canonical resize event is the one
/// [`consume_pending_signals`] synthesizes for the same underlying signal.
///
/// # Returns
///
/// - [`Continuation::Continue`]: all pending events consumed.
/// - [`Continuation::Stop`]: the executor is gone, or the read failed — event
///   delivery for this session is over.
///
/// [`consume_pending_signals`]: super::handler_signals::consume_pending_signals
pub(crate) fn consume_input_readiness<S: CursesEventSource>(
    source: &mut S,
    deliver_tx: &Sender<GatewayRequest>,
) -> Continuation {
    loop {
        match source.read_event() {
            Ok(Some(KEY_RESIZE)) => {
                DEBUG_GATEWAY_SHOW_INTERNALS.then(|| {
                    tracing::debug!(
                        message = "event-bridge: suppressed raw resize key"
                    );
                });
            }
            Ok(Some(code)) => {
                let key = KeyEvent::from_code(code);
                if deliver_tx.send(GatewayRequest::Deliver(key)).is_err() {
                    // Executor dropped its receiver - exit gracefully.
                    return Continuation::Stop;
                }
            }
            Ok(None) => return Continuation::Continue,
            // EINTR - retry the read.
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => {
                tracing::error!(
                    message = "event-bridge: input read failed, stopping delivery",
                    error = ?err
                );
                return Continuation::Stop;
            }
        }
    }
}

#[cfg(test)]
mod tests_input_handler {
    use super::*;
    use crate::key_code::KEY_UP;
    use std::{collections::VecDeque,
              io,
              os::fd::{AsRawFd, RawFd},
              sync::mpsc};

    struct FakeSource {
        reads: VecDeque<io::Result<Option<i32>>>,
    }

    impl FakeSource {
        fn with_codes(codes: &[i32]) -> Self {
            let mut reads: VecDeque<_> =
                codes.iter().map(|&c| Ok(Some(c))).collect();
            reads.push_back(Ok(None));
            Self { reads }
        }
    }

    impl AsRawFd for FakeSource {
        fn as_raw_fd(&self) -> RawFd { 0 }
    }

    impl CursesEventSource for FakeSource {
        fn read_event(&mut self) -> io::Result<Option<i32>> {
            self.reads.pop_front().unwrap_or(Ok(None))
        }

        fn recompute_geometry(&mut self) -> io::Result<()> { Ok(()) }
    }

    fn delivered_keys(rx: &mpsc::Receiver<GatewayRequest>) -> Vec<KeyEvent> {
        rx.try_iter()
            .map(|request| match request {
                GatewayRequest::Deliver(key) => key,
                other => panic!("unexpected request: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn drains_all_pending_events_in_order() {
        let mut source = FakeSource::with_codes(&[b'a' as i32, b'b' as i32, KEY_UP]);
        let (tx, rx) = mpsc::channel();

        let continuation = consume_input_readiness(&mut source, &tx);

        assert_eq!(continuation, Continuation::Continue);
        assert_eq!(
            delivered_keys(&rx),
            vec![KeyEvent::Char('a'), KeyEvent::Char('b'), KeyEvent::Up]
        );
    }

    #[test]
    fn raw_resize_key_is_suppressed() {
        let mut source = FakeSource::with_codes(&[KEY_RESIZE, b'x' as i32]);
        let (tx, rx) = mpsc::channel();

        let continuation = consume_input_readiness(&mut source, &tx);

        assert_eq!(continuation, Continuation::Continue);
        assert_eq!(delivered_keys(&rx), vec![KeyEvent::Char('x')]);
    }

    #[test]
    fn stops_when_executor_receiver_is_gone() {
        let mut source = FakeSource::with_codes(&[b'x' as i32]);
        let (tx, rx) = mpsc::channel();
        drop(rx);

        assert_eq!(consume_input_readiness(&mut source, &tx), Continuation::Stop);
    }

    #[test]
    fn stops_on_read_error() {
        let mut source = FakeSource {
            reads: VecDeque::from([Err(io::Error::other("tty gone"))]),
        };
        let (tx, _rx) = mpsc::channel();

        assert_eq!(consume_input_readiness(&mut source, &tx), Continuation::Stop);
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut source = FakeSource {
            reads: VecDeque::from([
                Err(io::Error::from(io::ErrorKind::Interrupted)),
                Ok(Some(b'k' as i32)),
                Ok(None),
            ]),
        };
        let (tx, rx) = mpsc::channel();

        let continuation = consume_input_readiness(&mut source, &tx);

        assert_eq!(continuation, Continuation::Continue);
        assert_eq!(delivered_keys(&rx), vec![KeyEvent::Char('k')]);
    }
}
