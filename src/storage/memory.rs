use anyhow::{bail, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{decode_roster, encode_roster, StudentStore, NAMESPACE_KEY};
use crate::student::StudentRoster;

/// In-process key-value store holding encoded text, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save` fail (simulates a full or read-only disk)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StudentStore for MemoryStore {
    fn load(&self) -> Result<StudentRoster> {
        match self.get_raw(NAMESPACE_KEY) {
            Some(text) => decode_roster(&text),
            None => Ok(StudentRoster::new()),
        }
    }

    fn save(&self, roster: &StudentRoster) -> Result<()> {
        if self.fail_writes.get() {
            bail!("Storage quota exceeded");
        }
        let text = encode_roster(roster)?;
        self.put_raw(NAMESPACE_KEY, &text);
        Ok(())
    }
}
