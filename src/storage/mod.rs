pub mod file;
pub mod memory;

pub use file::{get_data_path, JsonFileStore};
pub use memory::MemoryStore;

use anyhow::{Context, Result};

use crate::student::StudentRoster;

/// Key the student collection is stored under
pub const NAMESPACE_KEY: &str = "quran-tracker-students";

/// Persistence for the student collection. The whole collection is read and
/// written at once.
pub trait StudentStore {
    /// Load the collection. Nothing stored yet is an empty roster, not an error.
    fn load(&self) -> Result<StudentRoster>;

    /// Replace the stored collection. On failure the previously stored
    /// collection is left as it was.
    fn save(&self, roster: &StudentRoster) -> Result<()>;
}

/// Load the roster, treating any read failure as "no existing data".
pub fn load_or_empty(store: &dyn StudentStore) -> StudentRoster {
    match store.load() {
        Ok(roster) => roster,
        Err(e) => {
            crate::buffered_eprintln!("No existing data found ({:#}); starting empty", e);
            StudentRoster::new()
        }
    }
}

pub fn encode_roster(roster: &StudentRoster) -> Result<String> {
    serde_json::to_string(roster).context("Failed to encode students")
}

pub fn decode_roster(text: &str) -> Result<StudentRoster> {
    serde_json::from_str(text).context("Failed to decode students")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_empty_recovers() {
        let store = MemoryStore::new();
        store.put_raw(NAMESPACE_KEY, "{not json");
        let roster = load_or_empty(&store);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_encode_decode() {
        let mut roster = StudentRoster::new();
        roster.add_student("Ruqayyah");
        let text = encode_roster(&roster).unwrap();
        assert!(text.contains("\"averageScore\":0.0"));
        assert_eq!(decode_roster(&text).unwrap(), roster);
    }
}
