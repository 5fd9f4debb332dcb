//! String interning for node names and edge labels
//!
//! Dumps repeat the same names and edge labels across millions of lines.
//! Each distinct string is stored once and handed out as a shared
//! `Rc<str>`; every node holding it owns one reference. The table only
//! grows during a run.

use fnv::FnvHashSet;
use std::rc::Rc;

/// Run-scoped string table
#[derive(Debug, Default)]
pub struct StringInterner {
    table: FnvHashSet<Rc<str>>,
    bytes: usize,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared copy of `text`, storing it on first sight
    pub fn intern(&mut self, text: &str) -> Rc<str> {
        if let Some(existing) = self.table.get(text) {
            return Rc::clone(existing);
        }
        let shared: Rc<str> = Rc::from(text);
        self.bytes += text.len();
        self.table.insert(Rc::clone(&shared));
        shared
    }

    /// Number of distinct strings stored
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Total bytes of string content stored
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}
