pub mod record;
pub mod roster;

pub use record::StudentRecord;
pub use roster::{RosterError, StudentRoster};
