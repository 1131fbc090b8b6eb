pub mod record;
pub mod workflow;

pub use record::{finalize_session, finalize_session_at, SessionDraft, SessionRecord, DATE_FORMAT};
pub use workflow::{ScoringSession, SessionPhase};
