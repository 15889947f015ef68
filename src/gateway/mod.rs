// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The command gateway: a single executor thread that owns the native library.
//!
//! # Why an executor and not a mutex
//!
//! A mutex serializes the native calls but leaks two problems it cannot solve:
//!
//! 1. **Reentrancy**: a caller holding the lock that calls back into the gateway
//!    deadlocks on itself. With an executor there is nothing to re-acquire —
//!    requests queue behind each other regardless of who sends them.
//! 2. **Teardown ordering**: finalize must stop the input-reading bridge before
//!    the native library swaps its stream back. The executor owns the bridge
//!    handle, so the ordering is a plain sequence of statements in one function,
//!    not a protocol between lock holders.
//!
//! # Request flow
//!
//! ```text
//! caller thread                    executor thread
//! ─────────────                    ───────────────
//! build request + reply channel
//! tx.send(request) ───────────────▶ rx.recv()
//! reply_rx.recv()   [blocked]        resolve windows
//!                                    backend.invoke(..)   ◀── the only native call site
//! reply_rx.recv()  ◀─────────────── reply.send(result)
//! ```
//!
//! Submission order per caller is preserved end to end: a caller's second send
//! cannot happen before its first reply arrives, and the executor handles channel
//! messages in arrival order.
//!
//! # Module map
//!
//! | Module        | Responsibility                                        |
//! | :------------ | :----------------------------------------------------- |
//! | [`op`]        | [`TerminalOp`], [`WindowId`], request/reply vocabulary |
//! | [`error`]     | [`GatewayError`] taxonomy                              |
//! | [`executor`]  | The serialization thread itself                        |
//! | [`handle`]    | [`CursesGateway`], the cloneable public handle         |
//! | [`line_edit`] | [`LineEditor`] state machine for `read_line`           |

pub mod error;
pub(crate) mod executor;
pub mod handle;
pub mod line_edit;
pub mod op;

pub use error::*;
pub use handle::*;
pub use line_edit::*;
pub use op::*;
