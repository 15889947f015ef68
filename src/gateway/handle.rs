// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The cloneable public handle callers hold: [`CursesGateway`].

use crate::{attr_mask::AttrMask,
            backend::{CursesBackend, InitArgs},
            gateway::{error::{GatewayError, GatewayResult},
                      executor::GatewayExecutor,
                      line_edit::{BasicLineEditor, LINE_EDIT_MAX_LEN, LineEditStep,
                                  LineEditor},
                      op::{GatewayRequest, OpReply, SubscriptionId, TerminalOp,
                           WindowId}},
            key_code::KeyEvent};
use std::sync::{Arc,
                mpsc::{Receiver, Sender, channel}};

/// Sends the shutdown request when the last [`CursesGateway`] clone is dropped.
///
/// The executor keeps a clone of its own request sender for the bridge, so plain
/// channel disconnect can never fire — shutdown has to be an explicit message.
#[derive(Debug)]
struct ShutdownGuard {
    tx: Sender<GatewayRequest>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        let _unused = self.tx.send(GatewayRequest::Shutdown);
    }
}

/// Cloneable, thread-safe handle to the gateway executor.
///
/// Every method sends one request to the executor thread and blocks on its
/// per-request reply channel, so the public contract is synchronous while all
/// native access stays serialized on one thread. Clone freely and hand clones to
/// as many threads as needed; when the last clone is dropped the executor tears
/// down any still-active session and exits.
#[derive(Debug, Clone)]
pub struct CursesGateway {
    tx: Sender<GatewayRequest>,
    _guard: Arc<ShutdownGuard>,
}

/// A live event subscription: the receiving end of delivered [`KeyEvent`]s plus
/// the token that proves ownership to [`CursesGateway::unsubscribe`].
#[derive(Debug)]
pub struct EventSubscription {
    id: SubscriptionId,
    rx: Receiver<KeyEvent>,
}

impl EventSubscription {
    /// The token to pass to [`CursesGateway::unsubscribe`].
    #[must_use]
    pub fn id(&self) -> SubscriptionId { self.id }

    /// Blocks until the next event is delivered.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Disconnected`] if the session was finalized or the
    /// gateway shut down while waiting.
    pub fn recv(&self) -> GatewayResult<KeyEvent> {
        self.rx.recv().map_err(|_| GatewayError::Disconnected)
    }

    /// Blocks for up to `timeout` for the next event.
    ///
    /// `Ok(None)` means the timeout elapsed with nothing delivered.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Disconnected`] if the session was finalized or the
    /// gateway shut down while waiting.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> GatewayResult<Option<KeyEvent>> {
        use std::sync::mpsc::RecvTimeoutError;
        match self.rx.recv_timeout(timeout) {
            Ok(key) => Ok(Some(key)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(GatewayError::Disconnected),
        }
    }

    /// Returns the next event if one is already delivered, without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<KeyEvent> { self.rx.try_recv().ok() }
}

impl CursesGateway {
    /// Spawns the executor thread that will own `backend` and returns the
    /// handle. No native call happens until [`initialize`].
    ///
    /// [`initialize`]: CursesGateway::initialize
    #[must_use]
    pub fn new<B: CursesBackend>(backend: B) -> Self {
        let tx = GatewayExecutor::spawn(backend);
        Self {
            _guard: Arc::new(ShutdownGuard { tx: tx.clone() }),
            tx,
        }
    }

    /// Sends one request and blocks on its reply.
    fn request<T>(
        &self,
        make: impl FnOnce(Sender<GatewayResult<T>>) -> GatewayRequest,
    ) -> GatewayResult<T> {
        let (reply_tx, reply_rx) = channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| GatewayError::Disconnected)?;
        reply_rx.recv().map_err(|_| GatewayError::Disconnected)?
    }

    /// Runs the native initialization sequence and starts event delivery.
    ///
    /// On success the root (full-screen) window is available as
    /// [`WindowId::ROOT`]. The event bridge is started as part of this call; if
    /// it cannot start, the native session is rolled back and the error is
    /// returned — a session never runs without event delivery.
    ///
    /// # Errors
    ///
    /// [`GatewayError::AlreadyInitialized`], [`GatewayError::NativeCall`], or
    /// [`GatewayError::BridgeStartup`].
    pub fn initialize(&self, args: InitArgs) -> GatewayResult<()> {
        self.request(|reply| GatewayRequest::Initialize { args, reply })
    }

    /// Stops event delivery, then runs the native teardown sequence.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotInitialized`] or [`GatewayError::NativeCall`].
    pub fn finalize(&self) -> GatewayResult<()> {
        self.request(|reply| GatewayRequest::Finalize { reply })
    }

    /// Executes one typed operation, blocking until its native call returns.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`] for the full taxonomy; the common cases are
    /// [`GatewayError::NotInitialized`], [`GatewayError::InvalidHandle`], and
    /// [`GatewayError::NativeCall`].
    pub fn execute(&self, op: TerminalOp) -> GatewayResult<OpReply> {
        self.request(|reply| GatewayRequest::Execute { op, reply })
    }

    /// Creates a window and returns its gateway-issued handle.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn create_window(
        &self,
        rows: u16,
        cols: u16,
        row: u16,
        col: u16,
    ) -> GatewayResult<WindowId> {
        match self.execute(TerminalOp::CreateWindow {
            rows,
            cols,
            row,
            col,
        })? {
            OpReply::Window(id) => Ok(id),
            _ => Err(GatewayError::ReplyShape { name: "newwin" }),
        }
    }

    /// Destroys a window; its handle is invalid afterwards.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn destroy_window(&self, window: WindowId) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::DestroyWindow { window })?;
        Ok(())
    }

    /// Moves the cursor within a window.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn move_cursor(
        &self,
        window: WindowId,
        row: u16,
        col: u16,
    ) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::MoveCursor { window, row, col })?;
        Ok(())
    }

    /// Replaces a window's attribute set with the given encoded mask.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn set_attributes(
        &self,
        window: WindowId,
        mask: AttrMask,
    ) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::SetAttributes { window, mask })?;
        Ok(())
    }

    /// Writes text at the window's current cursor position.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn add_string(
        &self,
        window: WindowId,
        text: impl Into<String>,
    ) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::AddString {
            window,
            text: text.into(),
        })?;
        Ok(())
    }

    /// Flushes a window's pending output to the terminal.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn refresh_window(&self, window: WindowId) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::RefreshWindow { window })?;
        Ok(())
    }

    /// Resizes a window.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn resize_window(
        &self,
        window: WindowId,
        rows: u16,
        cols: u16,
    ) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::ResizeWindow { window, rows, cols })?;
        Ok(())
    }

    /// Returns a window's `(rows, cols)`.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn query_geometry(&self, window: WindowId) -> GatewayResult<(u16, u16)> {
        match self.execute(TerminalOp::QueryGeometry { window })? {
            OpReply::Pair(rows, cols) => Ok((rows, cols)),
            _ => Err(GatewayError::ReplyShape { name: "getmaxyx" }),
        }
    }

    /// Returns a window's cursor `(row, col)`.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn cursor_position(&self, window: WindowId) -> GatewayResult<(u16, u16)> {
        match self.execute(TerminalOp::CursorPosition { window })? {
            OpReply::Pair(row, col) => Ok((row, col)),
            _ => Err(GatewayError::ReplyShape { name: "getyx" }),
        }
    }

    /// Turns input echo on or off.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn set_echo(&self, enabled: bool) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::SetEcho { enabled })?;
        Ok(())
    }

    /// Sounds the terminal bell.
    ///
    /// # Errors
    ///
    /// See [`execute`](CursesGateway::execute).
    pub fn beep(&self) -> GatewayResult<()> {
        let _unused = self.execute(TerminalOp::Beep)?;
        Ok(())
    }

    /// Registers this caller as the single event subscriber.
    ///
    /// Events produced while nobody is subscribed are dropped, not queued —
    /// subscribing never replays the past.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SubscriberBusy`] if a subscription is already live, or
    /// [`GatewayError::NotInitialized`].
    pub fn subscribe(&self) -> GatewayResult<EventSubscription> {
        let (key_tx, key_rx) = channel();
        let id = self.request(|reply| GatewayRequest::Subscribe { tx: key_tx, reply })?;
        Ok(EventSubscription { id, rx: key_rx })
    }

    /// Releases the subscription identified by `id`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::StaleSubscription`] if `id` does not match the live
    /// subscription, or [`GatewayError::NotInitialized`].
    pub fn unsubscribe(&self, id: SubscriptionId) -> GatewayResult<()> {
        self.request(|reply| GatewayRequest::Unsubscribe { id, reply })
    }

    /// Subscribes, blocks for exactly one event, then unsubscribes.
    ///
    /// The convenience form of "wait for a keypress". The subscription is
    /// released on every path, including errors.
    ///
    /// # Errors
    ///
    /// Everything [`subscribe`] can fail with, plus
    /// [`GatewayError::Disconnected`] if the session ends mid-wait.
    ///
    /// [`subscribe`]: CursesGateway::subscribe
    pub fn poll_one_key(&self) -> GatewayResult<KeyEvent> {
        let subscription = self.subscribe()?;
        let key = subscription.recv();
        let _unused = self.unsubscribe(subscription.id());
        key
    }

    /// Reads a line of input at the window's current cursor position, echoing
    /// as it goes.
    ///
    /// Local echo is disabled for the duration (re-enabled on the way out);
    /// accepted characters are echoed in place, backspace erases visually, and
    /// Enter completes the line. Input is capped at [`LINE_EDIT_MAX_LEN`]
    /// characters.
    ///
    /// Each key is awaited with a fresh [`poll_one_key`] cycle, so the
    /// subscription slot is held only while waiting for exactly one event —
    /// never across the whole multi-key interaction.
    ///
    /// # Errors
    ///
    /// Everything [`subscribe`] and [`execute`] can fail with.
    ///
    /// [`execute`]: CursesGateway::execute
    /// [`poll_one_key`]: CursesGateway::poll_one_key
    /// [`subscribe`]: CursesGateway::subscribe
    pub fn read_line(&self, window: WindowId) -> GatewayResult<String> {
        let (row, col) = self.cursor_position(window)?;
        self.set_echo(false)?;
        let result = self.read_line_loop(window, row, col);
        let _unused = self.set_echo(true);
        result
    }

    fn read_line_loop(
        &self,
        window: WindowId,
        row: u16,
        col: u16,
    ) -> GatewayResult<String> {
        let mut editor = BasicLineEditor::new(row, col, LINE_EDIT_MAX_LEN);
        loop {
            let key = self.poll_one_key()?;
            let before = editor.cursor_col();
            if let LineEditStep::Done(text) = editor.process(key) {
                return Ok(text);
            }
            let after = editor.cursor_col();
            if after > before {
                // Accepted character: echo it in place.
                if let KeyEvent::Char(ch) = key {
                    self.add_string(window, ch.to_string())?;
                }
            } else if after < before {
                // Backspace: blank the erased cell and step back.
                self.move_cursor(window, row, after)?;
                self.add_string(window, " ")?;
                self.move_cursor(window, row, after)?;
            }
            self.refresh_window(window)?;
        }
    }

    /// Reads a line by driving a caller-supplied [`LineEditor`], with no echo
    /// management — the editor (or the caller between keys) owns rendering.
    ///
    /// Like [`read_line`], each key is awaited with a fresh [`poll_one_key`]
    /// cycle.
    ///
    /// # Errors
    ///
    /// Everything [`poll_one_key`] can fail with.
    ///
    /// [`poll_one_key`]: CursesGateway::poll_one_key
    /// [`read_line`]: CursesGateway::read_line
    pub fn read_line_with<E: LineEditor>(
        &self,
        mut editor: E,
    ) -> GatewayResult<String> {
        loop {
            let key = self.poll_one_key()?;
            if let LineEditStep::Done(text) = editor.process(key) {
                return Ok(text);
            }
        }
    }
}
