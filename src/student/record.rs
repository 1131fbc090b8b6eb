use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    id: u64,
    name: String,
    #[serde(default)]
    sessions: Vec<SessionRecord>,
    #[serde(default)]
    total_score: u64,
    #[serde(default)]
    average_score: f64,
}

impl StudentRecord {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sessions: Vec::new(),
            total_score: 0,
            average_score: 0.0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sessions in the order they were recorded (oldest first)
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    /// Raw mean of session totals; 0 with no sessions
    pub fn average_score(&self) -> f64 {
        self.average_score
    }

    pub fn latest_session(&self) -> Option<&SessionRecord> {
        self.sessions.last()
    }

    /// Append a session and recompute the aggregates from the whole sequence.
    /// Earlier sessions are never touched.
    pub fn append_session(&mut self, session: SessionRecord) {
        self.sessions.push(session);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_score = self.sessions.iter().map(|s| s.total_score() as u64).sum();
        self.average_score = if self.sessions.is_empty() {
            0.0
        } else {
            self.total_score as f64 / self.sessions.len() as f64
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{select_rubric, ReviewLevel};
    use crate::scoring::ScoreEntry;
    use crate::session::{finalize_session, SessionDraft};

    /// Finalize an advanced-level session worth exactly `total` points
    fn session_worth(total: u32, surah: &str) -> SessionRecord {
        let rubric = select_rubric(ReviewLevel::Advanced);
        let mut scores = ScoreEntry::new();
        let mut remaining = total;
        for (key, index, sub) in rubric.iter_sub_criteria() {
            let take = remaining.min(sub.points);
            scores.set(rubric, key, index, take).unwrap();
            remaining -= take;
        }
        let draft = SessionDraft {
            surah: surah.to_string(),
            ..SessionDraft::default()
        };
        finalize_session(draft, scores, ReviewLevel::Advanced)
    }

    #[test]
    fn test_new_student_empty() {
        let student = StudentRecord::new(1, "Aisha");
        assert!(student.sessions().is_empty());
        assert_eq!(student.total_score(), 0);
        assert_eq!(student.average_score(), 0.0);
        assert!(student.latest_session().is_none());
    }

    #[test]
    fn test_append_zero_session() {
        let mut student = StudentRecord::new(1, "Aisha");
        student.append_session(session_worth(0, "Al-Fatiha"));
        assert_eq!(student.sessions().len(), 1);
        assert_eq!(student.average_score(), 0.0);
    }

    #[test]
    fn test_two_sessions_average() {
        let mut student = StudentRecord::new(1, "Yusuf");
        student.append_session(session_worth(80, "Al-Mulk"));
        student.append_session(session_worth(90, "Al-Kahf"));

        assert_eq!(student.total_score(), 170);
        assert_eq!(student.average_score(), 85.0);
        let order: Vec<_> = student.sessions().iter().map(|s| s.total_score()).collect();
        assert_eq!(order, vec![80, 90]);
        assert_eq!(student.latest_session().unwrap().surah(), "Al-Kahf");
    }

    #[test]
    fn test_append_preserves_prior_sessions() {
        let mut student = StudentRecord::new(7, "Maryam");
        student.append_session(session_worth(55, "An-Nas"));
        let before = student.sessions()[0].clone();

        student.append_session(session_worth(71, "Al-Falaq"));
        student.append_session(session_worth(64, "Al-Ikhlas"));

        assert_eq!(student.sessions()[0], before);
        assert_eq!(student.total_score(), 190);
        assert!((student.average_score() - 190.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_without_aggregates() {
        let student: StudentRecord = serde_json::from_str(r#"{"id":5,"name":"Zaid"}"#).unwrap();
        assert_eq!(student.id(), 5);
        assert!(student.sessions().is_empty());
        assert_eq!(student.average_score(), 0.0);
    }
}
