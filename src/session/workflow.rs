use super::record::{finalize_session, SessionDraft, SessionRecord};
use crate::rubric::{select_rubric, ReviewLevel, RubricDefinition};
use crate::scoring::{score_breakdown, RawScore, ScoreBreakdown, ScoreEntry, ScoringError};

/// Where an open scoring session stands. The third state, finalized, is the
/// `SessionRecord` returned by `ScoringSession::finalize`, which consumes the
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    CollectingFields,
    EnteringScores,
}

/// One scoring session in progress for a single student.
#[derive(Debug, Clone)]
pub struct ScoringSession {
    phase: SessionPhase,
    level: ReviewLevel,
    draft: SessionDraft,
    scores: ScoreEntry,
}

impl ScoringSession {
    pub fn new(level: ReviewLevel) -> Self {
        Self {
            phase: SessionPhase::CollectingFields,
            level,
            draft: SessionDraft::default(),
            scores: ScoreEntry::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn level(&self) -> ReviewLevel {
        self.level
    }

    pub fn rubric(&self) -> &'static RubricDefinition {
        select_rubric(self.level)
    }

    pub fn draft(&self) -> &SessionDraft {
        &self.draft
    }

    pub fn scores(&self) -> &ScoreEntry {
        &self.scores
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.draft.date = date.into();
    }

    pub fn set_surah(&mut self, surah: impl Into<String>) {
        self.draft.surah = surah.into();
    }

    pub fn set_ayah_range(&mut self, ayah_range: impl Into<String>) {
        self.draft.ayah_range = ayah_range.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.draft.notes = notes.into();
    }

    /// Switch rubric. Category keys differ between levels, so entered scores
    /// are discarded.
    pub fn set_level(&mut self, level: ReviewLevel) {
        if level != self.level {
            self.level = level;
            self.scores.clear();
        }
    }

    /// Move on from the header fields to scoring
    pub fn begin_scoring(&mut self) {
        self.phase = SessionPhase::EnteringScores;
    }

    /// Record one sub-score (clamped). The first score moves the session into
    /// the scoring phase.
    pub fn set_score<'a>(
        &mut self,
        category: &str,
        index: usize,
        raw: impl Into<RawScore<'a>>,
    ) -> Result<u32, ScoringError> {
        let rubric = select_rubric(self.level);
        let value = self.scores.set(rubric, category, index, raw)?;
        self.phase = SessionPhase::EnteringScores;
        Ok(value)
    }

    pub fn score(&self, category: &str, index: usize) -> u32 {
        self.scores.get(category, index)
    }

    pub fn total(&self) -> u32 {
        crate::scoring::compute_session_total(self.rubric(), &self.scores)
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        score_breakdown(self.rubric(), &self.scores)
    }

    pub fn finalize(self) -> SessionRecord {
        finalize_session(self.draft, self.scores, self.level)
    }
}
