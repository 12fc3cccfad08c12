use std::path::Path;

use super::store::{AllianceStore, Lookup};

/// Whether a scanned alliance is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    New,
    Existing,
    Error(String),
}

/// Classifies `(server_id, tag)` against the store. Never writes to it.
pub fn match_alliance(store: &dyn AllianceStore, server_id: i64, tag: &str) -> MatchOutcome {
    match store.lookup_by_tag(server_id, tag) {
        Lookup::Found(_) => MatchOutcome::Existing,
        Lookup::NotFound => MatchOutcome::New,
        Lookup::Failed(reason) => MatchOutcome::Error(reason),
    }
}

impl MatchOutcome {
    /// Next step for the user once the staging file has been reviewed.
    pub fn instruction(&self, output: &Path) -> Option<String> {
        match self {
            MatchOutcome::New => Some(format!(
                "A new alliance will need to be created from this data. \
                 Please run 'alliance new -o {}' after verifying the data.",
                output.display()
            )),
            MatchOutcome::Existing => Some(format!(
                "This alliance already exists. To add the new data run \
                 'alliance add -o {}' after verifying the data.",
                output.display()
            )),
            MatchOutcome::Error(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[test]
    fn test_not_found_is_new() {
        let store = MemoryStore::default();
        assert_eq!(match_alliance(&store, 1, "ABC"), MatchOutcome::New);
    }

    #[test]
    fn test_found_is_existing() {
        let store = MemoryStore::with_alliance(1, "ABC", "Alpha");
        assert_eq!(match_alliance(&store, 1, "ABC"), MatchOutcome::Existing);
        assert_eq!(match_alliance(&store, 2, "ABC"), MatchOutcome::New);
    }

    #[test]
    fn test_failure_is_error() {
        let store = MemoryStore::failing("database is locked");
        assert_eq!(
            match_alliance(&store, 1, "ABC"),
            MatchOutcome::Error("database is locked".to_string())
        );
    }

    #[test]
    fn test_instruction_names_output_file() {
        let out = Path::new("scan/alliance.json");
        let new = MatchOutcome::New.instruction(out).unwrap();
        assert!(new.contains("alliance new -o scan/alliance.json"));

        let existing = MatchOutcome::Existing.instruction(out).unwrap();
        assert!(existing.contains("alliance add -o scan/alliance.json"));

        assert_eq!(MatchOutcome::Error("x".to_string()).instruction(out), None);
    }
}
