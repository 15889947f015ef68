// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH

//! Handler for `SIGWINCH` delivery.

use crate::{DEBUG_GATEWAY_SHOW_INTERNALS,
            backend::CursesEventSource,
            bridge::Continuation,
            gateway::op::GatewayRequest,
            key_code::KeyEvent};
use signal_hook::consts::SIGWINCH;
use signal_hook_mio::v1_0::Signals;
use std::sync::mpsc::Sender;

/// Drains all pending signals and synthesizes at most one resize event.
///
/// Multiple coalesced `SIGWINCH` deliveries result in a single event since the
/// terminal's current geometry is what matters, not how many times it changed in
/// between. Before emitting, [`recompute_geometry`] lets the native layer update
/// its internal view first — the same ordering the native library's own signal
/// handler chain would have produced.
///
/// If the geometry recompute fails (rare - typically means the tty disconnected),
/// the signal is dropped since there is no consistent state to report.
///
/// # Returns
///
/// - [`Continuation::Continue`]: processed (or nothing to do).
/// - [`Continuation::Stop`]: the executor is gone.
///
/// [`recompute_geometry`]: crate::backend::CursesEventSource::recompute_geometry
pub(crate) fn consume_pending_signals<S: CursesEventSource>(
    signals: &mut Signals,
    source: &mut S,
    deliver_tx: &Sender<GatewayRequest>,
) -> Continuation {
    let sigwinch_arrived = signals.pending().any(|sig| sig == SIGWINCH);

    if sigwinch_arrived {
        if let Err(err) = source.recompute_geometry() {
            DEBUG_GATEWAY_SHOW_INTERNALS.then(|| {
                tracing::debug!(
                    message = "event-bridge: SIGWINCH received but geometry recompute failed",
                    error = ?err
                );
            });
            return Continuation::Continue;
        }

        DEBUG_GATEWAY_SHOW_INTERNALS.then(|| {
            tracing::debug!(message = "event-bridge: SIGWINCH received");
        });

        if deliver_tx
            .send(GatewayRequest::Deliver(KeyEvent::Resize))
            .is_err()
        {
            // Executor dropped its receiver - exit gracefully.
            return Continuation::Stop;
        }
    }

    Continuation::Continue
}
