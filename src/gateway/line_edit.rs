// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Line-edit state machine boundary.
//!
//! The gateway's `read_line` loop feeds one key at a time to a [`LineEditor`] and
//! stops when it reports [`LineEditStep::Done`]. The machine's internals are its
//! own business — [`BasicLineEditor`] is the minimal built-in implementation, and
//! anything else (history, completion, kill ring) plugs in through the same
//! trait.

use crate::key_code::KeyEvent;

/// Fixed maximum accumulated length used by the built-in `read_line`.
pub const LINE_EDIT_MAX_LEN: usize = 80;

/// What the state machine reports after consuming one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditStep {
    /// Input complete; the accumulated text.
    Done(String),
    /// More input needed.
    More,
}

/// Consumes one key at a time and reports whether the line is complete.
pub trait LineEditor {
    fn process(&mut self, key: KeyEvent) -> LineEditStep;
}

/// Minimal line editor: printable characters accumulate (capped at the maximum
/// length), Backspace deletes, Enter completes.
#[derive(Debug)]
pub struct BasicLineEditor {
    row: u16,
    col: u16,
    max_len: usize,
    buffer: String,
}

impl BasicLineEditor {
    /// Creates a session anchored at the given cursor origin.
    #[must_use]
    pub fn new(row: u16, col: u16, max_len: usize) -> Self {
        Self {
            row,
            col,
            max_len,
            buffer: String::new(),
        }
    }

    /// The cursor origin this session was anchored at.
    #[must_use]
    pub fn origin(&self) -> (u16, u16) { (self.row, self.col) }

    /// The column the cursor would sit at after the accumulated text.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cursor_col(&self) -> u16 { self.col + self.buffer.len() as u16 }
}

impl LineEditor for BasicLineEditor {
    fn process(&mut self, key: KeyEvent) -> LineEditStep {
        match key {
            KeyEvent::Char('\n' | '\r') => {
                LineEditStep::Done(std::mem::take(&mut self.buffer))
            }
            KeyEvent::Backspace => {
                self.buffer.pop();
                LineEditStep::More
            }
            KeyEvent::Char(ch) if !ch.is_control() && self.buffer.len() < self.max_len => {
                self.buffer.push(ch);
                LineEditStep::More
            }
            // Everything else (arrows, function keys, resize, overflow) is a
            // no-op for the basic editor.
            _ => LineEditStep::More,
        }
    }
}

#[cfg(test)]
mod tests_basic_line_editor {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accumulates_until_enter() {
        let mut editor = BasicLineEditor::new(0, 0, LINE_EDIT_MAX_LEN);
        assert_eq!(editor.process(KeyEvent::Char('h')), LineEditStep::More);
        assert_eq!(editor.process(KeyEvent::Char('i')), LineEditStep::More);
        assert_eq!(
            editor.process(KeyEvent::Char('\n')),
            LineEditStep::Done("hi".into())
        );
    }

    #[test]
    fn backspace_deletes_the_last_char() {
        let mut editor = BasicLineEditor::new(0, 0, LINE_EDIT_MAX_LEN);
        editor.process(KeyEvent::Char('h'));
        editor.process(KeyEvent::Char('x'));
        editor.process(KeyEvent::Backspace);
        editor.process(KeyEvent::Char('i'));
        assert_eq!(
            editor.process(KeyEvent::Char('\r')),
            LineEditStep::Done("hi".into())
        );
    }

    #[test]
    fn backspace_on_empty_buffer_is_a_no_op() {
        let mut editor = BasicLineEditor::new(0, 0, LINE_EDIT_MAX_LEN);
        assert_eq!(editor.process(KeyEvent::Backspace), LineEditStep::More);
        assert_eq!(
            editor.process(KeyEvent::Char('\n')),
            LineEditStep::Done(String::new())
        );
    }

    #[test]
    fn input_is_capped_at_max_len() {
        let mut editor = BasicLineEditor::new(0, 0, 2);
        editor.process(KeyEvent::Char('a'));
        editor.process(KeyEvent::Char('b'));
        editor.process(KeyEvent::Char('c'));
        assert_eq!(
            editor.process(KeyEvent::Char('\n')),
            LineEditStep::Done("ab".into())
        );
    }

    #[test]
    fn special_keys_do_not_change_the_buffer() {
        let mut editor = BasicLineEditor::new(0, 0, LINE_EDIT_MAX_LEN);
        editor.process(KeyEvent::Char('h'));
        editor.process(KeyEvent::Up);
        editor.process(KeyEvent::Resize);
        editor.process(KeyEvent::Function(5));
        assert_eq!(
            editor.process(KeyEvent::Char('\n')),
            LineEditStep::Done("h".into())
        );
    }

    #[test]
    fn tracks_cursor_column_from_its_origin() {
        let mut editor = BasicLineEditor::new(3, 5, LINE_EDIT_MAX_LEN);
        assert_eq!(editor.origin(), (3, 5));
        editor.process(KeyEvent::Char('h'));
        editor.process(KeyEvent::Char('i'));
        assert_eq!(editor.cursor_col(), 7);
    }
}
