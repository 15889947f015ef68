// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw native key codes and the [`KeyEvent`] vocabulary.
//!
//! The native library reports input as integer codes: printable characters map to
//! their byte value, special keys use the classic curses numbering starting at
//! `0o402`. [`KeyEvent::from_code`] normalizes those integers into a tagged value
//! that consumers can match on without knowing the numbering.

/// Down arrow (`0o402`).
pub const KEY_DOWN: i32 = 258;
/// Up arrow.
pub const KEY_UP: i32 = 259;
/// Left arrow.
pub const KEY_LEFT: i32 = 260;
/// Right arrow.
pub const KEY_RIGHT: i32 = 261;
/// Home key.
pub const KEY_HOME: i32 = 262;
/// Backspace key as reported by the native keypad translation.
pub const KEY_BACKSPACE: i32 = 263;
/// Function key base: `F(n)` is `KEY_F0 + n`.
pub const KEY_F0: i32 = 264;
/// Highest function key code the native numbering reserves (`F63`).
pub const KEY_F63: i32 = KEY_F0 + 63;
/// Raw resize key (`0o632`) enqueued by the native library's own `SIGWINCH`
/// handler. The bridge suppresses this code — see
/// [`crate::bridge::handler_input`].
pub const KEY_RESIZE: i32 = 410;

/// A single delivered terminal input event.
///
/// Produced by the event bridge, consumed at most once by the currently
/// registered subscriber. `Code` carries any native code this vocabulary does not
/// name, so no input is ever unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character, or tab / carriage return / line feed.
    Char(char),
    /// A raw native code with no named mapping (pass-through).
    Code(i32),
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// Backspace (keypad code, `BS`, or `DEL`).
    Backspace,
    /// Function key `F(n)`, `n` in `1..=63`.
    Function(u8),
    /// Terminal resize. Synthesized by the bridge from `SIGWINCH`; never produced
    /// from the raw input stream.
    Resize,
}

impl KeyEvent {
    /// Normalizes a raw native input code.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        match code {
            KEY_DOWN => Self::Down,
            KEY_UP => Self::Up,
            KEY_LEFT => Self::Left,
            KEY_RIGHT => Self::Right,
            KEY_HOME => Self::Home,
            KEY_BACKSPACE | 0x08 | 0x7f => Self::Backspace,
            KEY_RESIZE => Self::Resize,
            c if c > KEY_F0 && c <= KEY_F63 => Self::Function((c - KEY_F0) as u8),
            c if (0x20..=0x7e).contains(&c) || c == 0x09 || c == 0x0a || c == 0x0d => {
                Self::Char(c as u8 as char)
            }
            other => Self::Code(other),
        }
    }
}

#[cfg(test)]
mod tests_key_event {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn printable_ascii_maps_to_char() {
        assert_eq!(KeyEvent::from_code(b'a' as i32), KeyEvent::Char('a'));
        assert_eq!(KeyEvent::from_code(b' ' as i32), KeyEvent::Char(' '));
        assert_eq!(KeyEvent::from_code(b'~' as i32), KeyEvent::Char('~'));
    }

    #[test]
    fn line_endings_and_tab_map_to_char() {
        assert_eq!(KeyEvent::from_code(0x0a), KeyEvent::Char('\n'));
        assert_eq!(KeyEvent::from_code(0x0d), KeyEvent::Char('\r'));
        assert_eq!(KeyEvent::from_code(0x09), KeyEvent::Char('\t'));
    }

    #[test]
    fn special_keys_map_to_named_variants() {
        assert_eq!(KeyEvent::from_code(KEY_UP), KeyEvent::Up);
        assert_eq!(KeyEvent::from_code(KEY_DOWN), KeyEvent::Down);
        assert_eq!(KeyEvent::from_code(KEY_LEFT), KeyEvent::Left);
        assert_eq!(KeyEvent::from_code(KEY_RIGHT), KeyEvent::Right);
        assert_eq!(KeyEvent::from_code(KEY_HOME), KeyEvent::Home);
        assert_eq!(KeyEvent::from_code(KEY_RESIZE), KeyEvent::Resize);
    }

    #[test]
    fn all_backspace_codes_collapse() {
        assert_eq!(KeyEvent::from_code(KEY_BACKSPACE), KeyEvent::Backspace);
        assert_eq!(KeyEvent::from_code(0x08), KeyEvent::Backspace);
        assert_eq!(KeyEvent::from_code(0x7f), KeyEvent::Backspace);
    }

    #[test]
    fn function_keys_carry_their_number() {
        assert_eq!(KeyEvent::from_code(KEY_F0 + 1), KeyEvent::Function(1));
        assert_eq!(KeyEvent::from_code(KEY_F0 + 12), KeyEvent::Function(12));
        assert_eq!(KeyEvent::from_code(KEY_F63), KeyEvent::Function(63));
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(KeyEvent::from_code(0x01), KeyEvent::Code(0x01));
        assert_eq!(KeyEvent::from_code(-1), KeyEvent::Code(-1));
        assert_eq!(KeyEvent::from_code(5000), KeyEvent::Code(5000));
    }
}
