use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::StudentRecord;
use crate::session::SessionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    UnknownStudent(String),
    AmbiguousName(String),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::UnknownStudent(s) => write!(f, "No student matches '{}'", s),
            RosterError::AmbiguousName(s) => {
                write!(f, "More than one student is named '{}'; use the id instead", s)
            }
        }
    }
}

impl std::error::Error for RosterError {}

/// The whole student collection, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRoster {
    students: Vec<StudentRecord>,
}

impl StudentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_students(students: Vec<StudentRecord>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Add a student named `name` (trimmed). Blank names are ignored and
    /// return None.
    pub fn add_student(&mut self, name: &str) -> Option<&StudentRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = self.next_id(Utc::now().timestamp_millis().max(0) as u64);
        self.students.push(StudentRecord::new(id, name));
        self.students.last()
    }

    /// Creation-time millis, bumped past every existing id so two students
    /// added within the same millisecond still get distinct ids.
    fn next_id(&self, now_millis: u64) -> u64 {
        let floor = self
            .students
            .iter()
            .map(|s| s.id() + 1)
            .max()
            .unwrap_or(0);
        now_millis.max(floor)
    }

    pub fn get(&self, id: u64) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.id() == id)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.students.iter().position(|s| s.id() == id)
    }

    /// Resolve a student reference: a numeric id, or a name compared
    /// case-insensitively.
    pub fn find(&self, reference: &str) -> Result<&StudentRecord, RosterError> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<u64>() {
            if let Some(student) = self.get(id) {
                return Ok(student);
            }
        }

        let wanted = reference.to_lowercase();
        let mut matches = self
            .students
            .iter()
            .filter(|s| s.name().to_lowercase() == wanted);
        match (matches.next(), matches.next()) {
            (Some(student), None) => Ok(student),
            (Some(_), Some(_)) => Err(RosterError::AmbiguousName(reference.to_string())),
            (None, _) => Err(RosterError::UnknownStudent(reference.to_string())),
        }
    }

    /// Append a finalized session to the student with `id`
    pub fn record_session(
        &mut self,
        id: u64,
        session: SessionRecord,
    ) -> Result<&StudentRecord, RosterError> {
        let student = self
            .students
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| RosterError::UnknownStudent(id.to_string()))?;
        student.append_session(session);
        Ok(student)
    }
}
