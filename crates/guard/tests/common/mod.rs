//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::sync::{Arc, Mutex};
use tidyup::Deleter;

/// Lifecycle of one slot in a [`ResourceTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Acquired,
    Closed,
    Failed,
}

/// A fake handle table: `open` hands out indices, `close` marks them closed.
///
/// Index 0 is never handed out and is the "acquisition failed" value.
#[derive(Debug, Default)]
pub struct ResourceTable {
    slots: RefCell<Vec<SlotState>>,
    closed: RefCell<Vec<usize>>,
}

impl ResourceTable {
    pub const INVALID: usize = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a slot. A failed acquisition still consumes an index but
    /// reports [`ResourceTable::INVALID`].
    pub fn open(&self, success: bool) -> usize {
        let mut slots = self.slots.borrow_mut();
        slots.push(if success {
            SlotState::Acquired
        } else {
            SlotState::Failed
        });
        if success {
            slots.len()
        } else {
            Self::INVALID
        }
    }

    pub fn close(&self, id: usize) {
        assert_ne!(id, Self::INVALID, "closed the invalid handle");
        self.slots.borrow_mut()[id - 1] = SlotState::Closed;
        self.closed.borrow_mut().push(id);
    }

    /// Index of the most recently opened slot, whether or not it succeeded
    pub fn last(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn state(&self, id: usize) -> SlotState {
        self.slots.borrow()[id - 1]
    }

    pub fn is_acquired(&self, id: usize) -> bool {
        self.state(id) == SlotState::Acquired
    }

    pub fn is_deleted(&self, id: usize) -> bool {
        self.state(id) == SlotState::Closed
    }

    pub fn close_count(&self, id: usize) -> usize {
        self.closed.borrow().iter().filter(|&&c| c == id).count()
    }

    /// Every close, in the order it happened
    pub fn closed(&self) -> Vec<usize> {
        self.closed.borrow().clone()
    }

    pub fn closer(&self) -> Close<'_> {
        Close(self)
    }
}

/// Named deleter so tests can compare it through `get_deleter`
#[derive(Debug, Clone, Copy)]
pub struct Close<'a>(&'a ResourceTable);

impl PartialEq for Close<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Deleter<usize> for Close<'_> {
    fn delete(&mut self, id: &mut usize) {
        self.0.close(*id);
    }
}

/// Ordered record of which actions ran
#[derive(Debug, Default)]
pub struct CallLog {
    entries: RefCell<Vec<&'static str>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: &'static str) {
        self.entries.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.borrow().iter().filter(|e| **e == entry).count()
    }
}

/// In-memory writer for a test subscriber
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}
