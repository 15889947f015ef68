// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH epoll kqueue EINTR

//! # The event bridge thread
//!
//! A dedicated [`std::thread`] converts two independent asynchronous sources into
//! one outbound event stream, using [`mio::Poll`] to wait on both with a single
//! blocking call:
//!
//! | Source                               | Token | Handler                                      |
//! | :----------------------------------- | :---- | :------------------------------------------- |
//! | Native input stream fd ([`SourceFd`]) | 0     | [`handler_input::consume_input_readiness`]   |
//! | `SIGWINCH` ([`signal_hook_mio`])      | 1     | [`handler_signals::consume_pending_signals`] |
//! | Shutdown [`Waker`]                    | 2     | inline stop-flag check                       |
//!
//! ```text
//! Idle ──spawn──▶ Watching ──input ready──▶ Draining reads ──▶ Watching
//!                    │
//!                    └──SIGWINCH──▶ recompute geometry ──▶ emit Resize ──▶ Watching
//! ```
//!
//! ## Why the raw resize key is suppressed
//!
//! The native library installs its own `SIGWINCH` handler which enqueues a raw
//! resize key on the input stream. The bridge *also* observes the signal through
//! [`signal_hook_mio`]. Without suppression every resize would be delivered
//! twice, once per path. The bridge's synthesized event is the canonical one
//! (it runs after [`recompute_geometry`], so the native layer's view is already
//! consistent), and the raw key is discarded whenever the read path returns it.
//! Double delivery is eliminated by design, not by chance.
//!
//! ## Delivery policy
//!
//! Events are forwarded to the gateway executor as fire-and-forget
//! [`GatewayRequest::Deliver`] messages; the executor hands them to the current
//! subscriber or drops them if none is registered. At-most-once, no queue, no
//! replay.
//!
//! ## Signals are never handled in signal context
//!
//! [`signal_hook_mio`] turns signal delivery into pipe readability, so all resize
//! work runs on this thread's normal execution context — nothing
//! non-reentrant-safe ever runs inside a signal handler.
//!
//! [`GatewayRequest::Deliver`]: crate::gateway::op::GatewayRequest::Deliver
//! [`SourceFd`]: mio::unix::SourceFd
//! [`Waker`]: mio::Waker
//! [`recompute_geometry`]: crate::backend::CursesEventSource::recompute_geometry

pub mod handler_input;
pub mod handler_signals;
pub mod poller_thread;
pub mod sources;

pub(crate) use poller_thread::*;
pub use sources::*;

/// Whether the bridge's event loop keeps running after one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Stop,
}
