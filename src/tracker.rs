use anyhow::Result;

use crate::session::SessionRecord;
use crate::storage::{load_or_empty, StudentStore};
use crate::student::{RosterError, StudentRecord, StudentRoster};

/// Application state: the in-memory roster plus the store it is persisted to.
///
/// Every mutation is applied in memory first and then saved. When the save
/// fails the change is kept in memory (it stays the source of truth) and the
/// error is returned so the caller can tell the user.
pub struct Tracker {
    roster: StudentRoster,
    store: Box<dyn StudentStore>,
}

#[derive(Debug)]
pub enum SaveError {
    Roster(RosterError),
    Persist(anyhow::Error),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Roster(e) => write!(f, "{}", e),
            SaveError::Persist(e) => write!(f, "Error saving data: {:#}", e),
        }
    }
}

impl std::error::Error for SaveError {}

impl Tracker {
    /// Load the roster from `store`; unreadable data starts an empty roster.
    pub fn open(store: Box<dyn StudentStore>) -> Self {
        let roster = load_or_empty(store.as_ref());
        Self { roster, store }
    }

    pub fn roster(&self) -> &StudentRoster {
        &self.roster
    }

    pub fn students(&self) -> &[StudentRecord] {
        self.roster.students()
    }

    pub fn student(&self, id: u64) -> Option<&StudentRecord> {
        self.roster.get(id)
    }

    /// Add a student. `Ok(None)` when the name is blank (nothing changes).
    pub fn add_student(&mut self, name: &str) -> Result<Option<u64>, SaveError> {
        let id = match self.roster.add_student(name) {
            Some(student) => student.id(),
            None => return Ok(None),
        };
        self.persist()?;
        Ok(Some(id))
    }

    /// Append a finalized session to a student and save.
    pub fn record_session(&mut self, id: u64, session: SessionRecord) -> Result<(), SaveError> {
        self.roster
            .record_session(id, session)
            .map_err(SaveError::Roster)?;
        self.persist()
    }

    pub fn persist(&self) -> Result<(), SaveError> {
        self.store.save(&self.roster).map_err(SaveError::Persist)
    }
}
