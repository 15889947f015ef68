// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The typed operation surface and the executor's request vocabulary.
//!
//! [`TerminalOp`] is the representative set of forwarded native operations. Each
//! variant is pure parameter marshaling: the executor resolves [`WindowId`]s to
//! raw native handles, builds the positional [`NativeCall`], and shapes the
//! [`NativeReply`] into an [`OpReply`].
//!
//! [`NativeCall`]: crate::backend::NativeCall
//! [`NativeReply`]: crate::backend::NativeReply

use crate::{attr_mask::AttrMask,
            backend::InitArgs,
            gateway::error::GatewayResult,
            key_code::KeyEvent};
use std::sync::mpsc::Sender;

/// Gateway-issued handle for a native window.
///
/// Window handles are owned by their creators, but every operation on them still
/// funnels through the single executor, so no extra locking guards window state.
/// Using a handle after [`TerminalOp::DestroyWindow`] fails with
/// [`GatewayError::InvalidHandle`].
///
/// [`GatewayError::InvalidHandle`]: crate::gateway::error::GatewayError::InvalidHandle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

impl WindowId {
    /// The root (full-screen) window registered by initialize.
    pub const ROOT: Self = Self(0);
}

/// Token returned by subscribe; required by unsubscribe.
///
/// Tokens make the subscriber bookkeeping race-free: an unsubscribe carrying a
/// token that no longer matches the live subscription is rejected instead of
/// silently tearing down someone else's wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(pub(crate) u64);

/// One forwarded terminal operation (request/reply shape, executed serially).
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalOp {
    CreateWindow { rows: u16, cols: u16, row: u16, col: u16 },
    DestroyWindow { window: WindowId },
    MoveCursor { window: WindowId, row: u16, col: u16 },
    SetAttributes { window: WindowId, mask: AttrMask },
    AddString { window: WindowId, text: String },
    RefreshWindow { window: WindowId },
    ResizeWindow { window: WindowId, rows: u16, cols: u16 },
    QueryGeometry { window: WindowId },
    CursorPosition { window: WindowId },
    SetEcho { enabled: bool },
    Beep,
}

impl TerminalOp {
    /// The native operation name this marshals to.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateWindow { .. } => "newwin",
            Self::DestroyWindow { .. } => "delwin",
            Self::MoveCursor { .. } => "wmove",
            Self::SetAttributes { .. } => "wattrset",
            Self::AddString { .. } => "waddstr",
            Self::RefreshWindow { .. } => "wrefresh",
            Self::ResizeWindow { .. } => "wresize",
            Self::QueryGeometry { .. } => "getmaxyx",
            Self::CursorPosition { .. } => "getyx",
            Self::SetEcho { enabled: true } => "echo",
            Self::SetEcho { enabled: false } => "noecho",
            Self::Beep => "beep",
        }
    }

    /// The window handle this operation targets, if any.
    #[must_use]
    pub const fn window(&self) -> Option<WindowId> {
        match self {
            Self::DestroyWindow { window }
            | Self::MoveCursor { window, .. }
            | Self::SetAttributes { window, .. }
            | Self::AddString { window, .. }
            | Self::RefreshWindow { window }
            | Self::ResizeWindow { window, .. }
            | Self::QueryGeometry { window }
            | Self::CursorPosition { window } => Some(*window),
            Self::CreateWindow { .. } | Self::SetEcho { .. } | Self::Beep => None,
        }
    }
}

/// Typed success value of an executed [`TerminalOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpReply {
    Unit,
    Bool(bool),
    Int(i64),
    Window(WindowId),
    /// `(rows, cols)` for geometry queries, `(row, col)` for cursor queries.
    Pair(u16, u16),
}

/// One message on the executor's request channel.
///
/// Every public gateway call maps to exactly one request; the caller blocks on
/// the per-request reply channel, which is what makes the public contract
/// synchronous while execution stays linearized on one thread.
#[derive(Debug)]
pub(crate) enum GatewayRequest {
    Initialize {
        args: InitArgs,
        reply: Sender<GatewayResult<()>>,
    },
    Finalize {
        reply: Sender<GatewayResult<()>>,
    },
    Execute {
        op: TerminalOp,
        reply: Sender<GatewayResult<OpReply>>,
    },
    Subscribe {
        tx: Sender<KeyEvent>,
        reply: Sender<GatewayResult<SubscriptionId>>,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: Sender<GatewayResult<()>>,
    },
    /// Fire-and-forget event delivery from the bridge thread.
    Deliver(KeyEvent),
    /// Sent by the last dropped gateway handle; tears down if still active.
    Shutdown,
}
