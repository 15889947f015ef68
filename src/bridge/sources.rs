// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`mio::Token`] ↔ source mapping for the bridge's event loop.

use mio::Token;

/// Identifies which registered source became ready.
///
/// This enum is the single source of truth for the token ↔ source mapping. When
/// [`mio::Poll::poll()`] returns, each event carries a [`Token`]; use
/// [`from_token()`] to route it to the right handler.
///
/// [`from_token()`]: SourceKind::from_token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The native input stream has data available to read.
    Input,
    /// `SIGWINCH` arrived (readable via the signal adapter's internal pipe).
    Signals,
    /// Wakeup from [`mio::Waker`] — check whether shutdown was requested.
    ShutdownWaker,
    /// Unknown token - should not happen in normal operation.
    Unknown,
}

impl SourceKind {
    /// Returns the [`Token`] used to register this source kind.
    ///
    /// # Panics
    ///
    /// Panics if called on [`SourceKind::Unknown`].
    #[must_use]
    pub const fn to_token(self) -> Token {
        match self {
            Self::Input => Token(0),
            Self::Signals => Token(1),
            Self::ShutdownWaker => Token(2),
            Self::Unknown => panic!("Unknown source has no token"),
        }
    }

    /// Converts a ready event's [`Token`] back to its source kind.
    #[must_use]
    pub const fn from_token(token: Token) -> Self {
        match token.0 {
            0 => Self::Input,
            1 => Self::Signals,
            2 => Self::ShutdownWaker,
            _ => Self::Unknown,
        }
    }
}
