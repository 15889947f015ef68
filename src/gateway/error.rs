// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Error taxonomy for the gateway. See [`GatewayError`].

use crate::{backend::NativeCallError, gateway::op::WindowId};

/// Result alias used across the gateway's public surface.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Everything a gateway operation can fail with.
///
/// | Variant                | Cause                                                        |
/// | :--------------------- | :----------------------------------------------------------- |
/// | [`NotInitialized`]     | Any operation other than initialize before initialize        |
/// | [`AlreadyInitialized`] | A second initialize while a session is active                |
/// | [`NativeCall`]         | The native library reported a non-success status             |
/// | [`InvalidHandle`]      | Operation referenced a released or unknown window handle     |
/// | [`SubscriberBusy`]     | A second subscribe while one subscription is live            |
/// | [`StaleSubscription`]  | Unsubscribe with a token that no longer matches              |
/// | [`BridgeStartup`]      | Readiness-watch registration or thread spawn failed          |
/// | [`Disconnected`]       | The executor thread is gone                                  |
/// | [`ReplyShape`]         | The native library answered with an unexpected reply shape   |
///
/// Native failures are surfaced synchronously and never retried; ordinary
/// failures never panic — callers get a failure result they must check.
///
/// [`AlreadyInitialized`]: Self::AlreadyInitialized
/// [`BridgeStartup`]: Self::BridgeStartup
/// [`Disconnected`]: Self::Disconnected
/// [`InvalidHandle`]: Self::InvalidHandle
/// [`NativeCall`]: Self::NativeCall
/// [`NotInitialized`]: Self::NotInitialized
/// [`ReplyShape`]: Self::ReplyShape
/// [`StaleSubscription`]: Self::StaleSubscription
/// [`SubscriberBusy`]: Self::SubscriberBusy
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum GatewayError {
    /// The terminal session has not been initialized.
    #[error("terminal is not initialized")]
    #[diagnostic(
        code(r3bl_curses_gateway::not_initialized),
        help("Call `initialize` before any other terminal operation.")
    )]
    NotInitialized,

    /// A terminal session is already active.
    #[error("terminal is already initialized")]
    #[diagnostic(
        code(r3bl_curses_gateway::already_initialized),
        help("At most one native session exists per gateway. Call `finalize` first.")
    )]
    AlreadyInitialized,

    /// The native library reported a non-success status for this operation.
    #[error("native call `{name}` failed")]
    #[diagnostic(code(r3bl_curses_gateway::native_call_failure))]
    NativeCall {
        /// The native operation name.
        name: &'static str,
        #[source]
        source: NativeCallError,
    },

    /// The operation referenced a window handle that is not registered.
    #[error("window handle {0:?} is not registered (already destroyed or never created)")]
    #[diagnostic(code(r3bl_curses_gateway::invalid_handle))]
    InvalidHandle(WindowId),

    /// A subscription is already live.
    #[error("another subscriber is already registered")]
    #[diagnostic(
        code(r3bl_curses_gateway::subscriber_busy),
        help(
            "Exactly one live event subscriber is allowed at a time. \
             Unsubscribe the current one before subscribing again."
        )
    )]
    SubscriberBusy,

    /// The unsubscribe token does not match the live subscription.
    #[error("subscription token is stale")]
    #[diagnostic(code(r3bl_curses_gateway::stale_subscription))]
    StaleSubscription,

    /// The event bridge could not be started; initialize was rolled back.
    #[error("failed to start the event bridge")]
    #[diagnostic(
        code(r3bl_curses_gateway::bridge_startup),
        help(
            "Check OS resource limits - `ulimit -n` for file descriptors, \
             `ulimit -u` for threads."
        )
    )]
    BridgeStartup(#[source] std::io::Error),

    /// The executor thread has exited; this handle can no longer be used.
    #[error("gateway executor is no longer running")]
    #[diagnostic(code(r3bl_curses_gateway::disconnected))]
    Disconnected,

    /// The native library answered with a reply shape the operation does not
    /// produce.
    #[error("unexpected native reply shape for `{name}`")]
    #[diagnostic(code(r3bl_curses_gateway::reply_shape))]
    ReplyShape {
        /// The native operation name.
        name: &'static str,
    },
}
