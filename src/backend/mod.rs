// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Opaque boundary traits to the native terminal-control library.
//!
//! The native library is a process-wide, single-threaded resource: it owns global
//! cursor/window state, is not reentrant, and its read call blocks. This module
//! defines the two seams the rest of the crate is written against:
//!
//! | Trait                 | Role                                                |
//! | :-------------------- | :-------------------------------------------------- |
//! | [`CursesBackend`]     | Control side: initialize, invoke named op, finalize |
//! | [`CursesEventSource`] | Read side: non-blocking event reads + resize hook   |
//!
//! Only the gateway executor ever calls [`CursesBackend`]; only the bridge thread
//! ever calls [`CursesEventSource`]. The split is what lets the bridge read input
//! concurrently with the executor without violating the library's
//! single-threaded contract: the read side is handed out exactly once by
//! [`CursesBackend::initialize`] and performs only reads that readiness has
//! already confirmed will not block.

use smallvec::SmallVec;
use std::os::fd::AsRawFd;

#[cfg(test)]
pub mod scripted;

/// The native library's own opaque window handle.
pub type RawWindow = u64;

/// One positional argument of a native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeArg {
    Int(i64),
    Str(String),
    Window(RawWindow),
}

/// A named native operation with positional arguments, ready to execute.
///
/// Most calls take at most four arguments, hence the inline capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCall {
    pub name: &'static str,
    pub args: SmallVec<[NativeArg; 4]>,
}

impl NativeCall {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: NativeArg) -> Self {
        self.args.push(arg);
        self
    }
}

/// A successful result from a native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeReply {
    Unit,
    Bool(bool),
    Int(i64),
    Window(RawWindow),
    /// A `(row-ish, col-ish)` pair, e.g. from geometry or cursor queries.
    Pair(i64, i64),
}

/// A non-success status reported by the native library for one call.
///
/// The gateway surfaces these synchronously to the caller; nothing is retried
/// (the native library's retry semantics are unsafe to assume).
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
#[diagnostic(code(r3bl_curses_gateway::native_status))]
pub struct NativeCallError {
    pub message: String,
}

impl NativeCallError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Arguments to the native initialization sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitArgs {
    /// Terminal type override (`TERM`), if any.
    pub term: Option<String>,
    /// Path to the tty device to attach to, if not the controlling terminal.
    pub tty_path: Option<String>,
}

/// What a successful [`CursesBackend::initialize`] hands back.
#[derive(Debug)]
pub struct InitOutcome<S> {
    /// The read side of the native input stream.
    pub event_source: S,
    /// The native handle for the root (full-screen) window.
    pub root_window: RawWindow,
}

/// Control boundary to the native library.
///
/// Implementations are moved onto the gateway executor thread at spawn time and
/// never touched from anywhere else, which is why `Send` is required but `Sync`
/// is not.
pub trait CursesBackend: Send + 'static {
    type EventSource: CursesEventSource;

    /// Runs the native initialization sequence and hands out the read side of
    /// the input stream. Called at most once before a matching [`finalize`].
    ///
    /// [`finalize`]: CursesBackend::finalize
    fn initialize(
        &mut self,
        args: &InitArgs,
    ) -> Result<InitOutcome<Self::EventSource>, NativeCallError>;

    /// Executes one named operation. The executor guarantees calls never
    /// overlap.
    fn invoke(&mut self, call: &NativeCall) -> Result<NativeReply, NativeCallError>;

    /// Tears the native library down. The bridge thread is already stopped and
    /// joined when this runs.
    fn finalize(&mut self) -> Result<(), NativeCallError>;
}

/// Read boundary to the native input stream, owned by the bridge thread.
///
/// `AsRawFd` exposes the input stream's descriptor so the bridge can register it
/// with [`mio::Poll`] for readiness.
pub trait CursesEventSource: AsRawFd + Send + 'static {
    /// Reads one pending input code, or `Ok(None)` when nothing is pending.
    ///
    /// The bridge only calls this after readiness was confirmed, so a compliant
    /// implementation never blocks here.
    fn read_event(&mut self) -> std::io::Result<Option<i32>>;

    /// Lets the native layer recompute its internal geometry after `SIGWINCH`.
    ///
    /// The bridge calls this before synthesizing the resize event, preserving
    /// the native-library-first ordering of the original signal handler chain.
    fn recompute_geometry(&mut self) -> std::io::Result<()>;
}
