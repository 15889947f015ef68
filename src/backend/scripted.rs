// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Scripted, instrumented backend used by this crate's tests.
//!
//! - Every [`invoke`] is recorded in execution order, and an in-flight flag trips
//!   [`ScriptRemote::overlap_detected`] if two invocations ever overlap in time —
//!   this is what the linearization tests assert on.
//! - Keys are injected with [`ScriptRemote::push_key`]: the code is queued and one
//!   byte is written to a [`mio::unix::pipe`], whose read end stands in for the
//!   native input stream fd that the bridge polls.
//!
//! [`invoke`]: super::CursesBackend::invoke

use super::{CursesBackend, CursesEventSource, InitArgs, InitOutcome, NativeCall,
            NativeCallError, NativeReply, RawWindow};
use mio::unix::pipe;
use std::{collections::{HashSet, VecDeque},
          io::{ErrorKind, Read as _, Write as _},
          os::fd::{AsRawFd, RawFd},
          sync::{Arc, Mutex,
                 atomic::{AtomicBool, AtomicUsize, Ordering}},
          thread,
          time::Duration};

/// Test-side handle to observe and drive a [`ScriptedBackend`] after it has been
/// moved onto the gateway executor thread.
#[derive(Debug, Clone)]
pub struct ScriptRemote {
    calls: Arc<Mutex<Vec<NativeCall>>>,
    overlap_detected: Arc<AtomicBool>,
    geometry_recomputes: Arc<AtomicUsize>,
    key_pipe_tx: Arc<Mutex<Option<pipe::Sender>>>,
    key_queue: Arc<Mutex<VecDeque<i32>>>,
}

impl ScriptRemote {
    /// Queues one raw input code and signals readiness on the input pipe.
    ///
    /// # Panics
    ///
    /// Panics if called before `initialize` has created the pipe.
    pub fn push_key(&self, code: i32) {
        self.key_queue.lock().unwrap().push_back(code);
        let mut guard = self.key_pipe_tx.lock().unwrap();
        let sender = guard.as_mut().expect("push_key before initialize");
        sender.write_all(&[1]).expect("scripted input pipe write failed");
    }

    /// All native calls recorded so far, in execution order.
    pub fn calls(&self) -> Vec<NativeCall> { self.calls.lock().unwrap().clone() }

    /// Just the operation names, in execution order.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|c| c.name).collect()
    }

    /// True if two `invoke` executions ever overlapped in time.
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    /// How many times the bridge asked the native layer to recompute geometry.
    pub fn geometry_recomputes(&self) -> usize {
        self.geometry_recomputes.load(Ordering::SeqCst)
    }
}

/// Instrumented stand-in for the native library.
#[derive(Debug)]
pub struct ScriptedBackend {
    remote: ScriptRemote,
    fail_calls: HashSet<&'static str>,
    in_flight: AtomicBool,
    next_window: RawWindow,
    invoke_delay: Duration,
}

impl ScriptedBackend {
    pub fn new() -> (Self, ScriptRemote) {
        let remote = ScriptRemote {
            calls: Arc::new(Mutex::new(Vec::new())),
            overlap_detected: Arc::new(AtomicBool::new(false)),
            geometry_recomputes: Arc::new(AtomicUsize::new(0)),
            key_pipe_tx: Arc::new(Mutex::new(None)),
            key_queue: Arc::new(Mutex::new(VecDeque::new())),
        };
        let backend = Self {
            remote: remote.clone(),
            fail_calls: HashSet::new(),
            in_flight: AtomicBool::new(false),
            next_window: 1,
            invoke_delay: Duration::ZERO,
        };
        (backend, remote)
    }

    /// Scripts a non-success native status for the named operation.
    #[must_use]
    pub fn fail_on(mut self, name: &'static str) -> Self {
        self.fail_calls.insert(name);
        self
    }

    /// Holds each `invoke` open for `delay`, widening the window in which an
    /// overlapping call would be caught.
    #[must_use]
    pub fn with_invoke_delay(mut self, delay: Duration) -> Self {
        self.invoke_delay = delay;
        self
    }
}

impl CursesBackend for ScriptedBackend {
    type EventSource = ScriptedEventSource;

    fn initialize(
        &mut self,
        _args: &InitArgs,
    ) -> Result<InitOutcome<Self::EventSource>, NativeCallError> {
        self.remote
            .calls
            .lock()
            .unwrap()
            .push(NativeCall::new("initscr"));
        let (tx, rx) =
            pipe::new().map_err(|err| NativeCallError::new(err.to_string()))?;
        *self.remote.key_pipe_tx.lock().unwrap() = Some(tx);
        Ok(InitOutcome {
            event_source: ScriptedEventSource {
                rx,
                queue: self.remote.key_queue.clone(),
                geometry_recomputes: self.remote.geometry_recomputes.clone(),
            },
            root_window: 1,
        })
    }

    fn invoke(&mut self, call: &NativeCall) -> Result<NativeReply, NativeCallError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.remote.overlap_detected.store(true, Ordering::SeqCst);
        }
        if !self.invoke_delay.is_zero() {
            thread::sleep(self.invoke_delay);
        }
        self.remote.calls.lock().unwrap().push(call.clone());

        let result = if self.fail_calls.contains(call.name) {
            Err(NativeCallError::new(format!(
                "scripted non-success status for `{}`",
                call.name
            )))
        } else {
            Ok(match call.name {
                "newwin" => {
                    self.next_window += 1;
                    NativeReply::Window(self.next_window)
                }
                "getmaxyx" => NativeReply::Pair(24, 80),
                "getyx" => NativeReply::Pair(3, 5),
                _ => NativeReply::Unit,
            })
        };

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    fn finalize(&mut self) -> Result<(), NativeCallError> {
        self.remote
            .calls
            .lock()
            .unwrap()
            .push(NativeCall::new("endwin"));
        // Drop the write end so the pipe fully closes with the session.
        *self.remote.key_pipe_tx.lock().unwrap() = None;
        Ok(())
    }
}

/// Read side of the scripted input stream: one pipe byte per queued key code.
#[derive(Debug)]
pub struct ScriptedEventSource {
    rx: pipe::Receiver,
    queue: Arc<Mutex<VecDeque<i32>>>,
    geometry_recomputes: Arc<AtomicUsize>,
}

impl AsRawFd for ScriptedEventSource {
    fn as_raw_fd(&self) -> RawFd { self.rx.as_raw_fd() }
}

impl CursesEventSource for ScriptedEventSource {
    fn read_event(&mut self) -> std::io::Result<Option<i32>> {
        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(self.queue.lock().unwrap().pop_front()),
            Err(err)
                if err.kind() == ErrorKind::WouldBlock
                    || err.kind() == ErrorKind::Interrupted =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn recompute_geometry(&mut self) -> std::io::Result<()> {
        self.geometry_recomputes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
