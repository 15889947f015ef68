// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH epoll kqueue linearized

//! # Command gateway & event bridge for a curses-style terminal library
//!
//! Curses-style terminal libraries own global cursor/window state, are not
//! reentrant, and read input with blocking calls. This crate lets any number of
//! concurrent callers drive such a library safely, and turns its blocking input
//! into delivered messages:
//!
//! ```text
//! ┌──────────────┐                     ┌──────────────────────────────────────┐
//! │ Caller A     │── TerminalOp ──────▶│ Gateway executor (std::thread)       │
//! │ Caller B     │── TerminalOp ──────▶│   • owns the CursesBackend           │
//! │ Caller C     │── subscribe ───────▶│   • executes one request at a time   │
//! └──────────────┘   (blocks on reply) │   • window registry, subscriber slot │
//!                                      └───────────▲──────────────────────────┘
//!                                                  │ Deliver(KeyEvent)
//!                                      ┌───────────┴──────────────────────────┐
//!                                      │ Event bridge (std::thread)           │
//!                                      │   mio::Poll waits on:                │
//!                                      │     • native input fd  (Token 0)     │
//!                                      │     • SIGWINCH signals (Token 1)     │
//!                                      │     • shutdown waker   (Token 2)     │
//!                                      └──────────────────────────────────────┘
//! ```
//!
//! ## The three guarantees
//!
//! 1. **Linearized native access**: every operation against the native library is
//!    executed by exactly one thread, one at a time, in submission order per
//!    caller. The mutual exclusion is structural (an executor owns the resource),
//!    not a lock taken by callers — recursive calls cannot deadlock and nothing
//!    outside the executor can touch the backend.
//! 2. **No double resize**: the native library's own `SIGWINCH` handling enqueues
//!    a raw resize key on the input stream, and the bridge also observes the
//!    signal itself. The bridge suppresses the raw key and synthesizes exactly one
//!    [`KeyEvent::Resize`] per observed signal burst, so a resize is never
//!    delivered twice.
//! 3. **At most one subscriber**: event delivery goes to a single registered
//!    subscriber. A second subscribe is rejected, events produced with no
//!    subscriber are dropped (no queue, no replay), and subscription tokens make
//!    unsubscribe race-free.
//!
//! ## Module map
//!
//! | Module       | Responsibility                                               |
//! | :----------- | :----------------------------------------------------------- |
//! | [`attr_mask`] | Pure bitmask encoding of color pairs and display attributes |
//! | [`key_code`]  | Raw native key codes and the [`KeyEvent`] vocabulary        |
//! | [`backend`]   | Opaque boundary traits to the native terminal library       |
//! | [`gateway`]   | Executor thread, typed operation surface, consumers         |
//! | [`bridge`]    | mio poller thread translating readiness/signals to events   |
//!
//! ## Starting the bridge is part of `initialize`
//!
//! The native initialization sequence swaps the process input stream; nothing may
//! read that stream while the swap happens. This crate guarantees that by
//! construction: the bridge thread is spawned only after the native initialize
//! call has returned, and it is stopped and joined before the native finalize
//! call runs.

// Enable strict error handling in production code, relax for tests.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

pub mod attr_mask;
pub mod backend;
pub mod bridge;
pub mod gateway;
pub mod key_code;

pub use attr_mask::*;
pub use backend::*;
pub use gateway::*;
pub use key_code::*;

/// Global debug flag gating chatty internals logging in the executor and the
/// bridge. Local (module scoped) flags can override this.
pub const DEBUG_GATEWAY_SHOW_INTERNALS: bool = false;
