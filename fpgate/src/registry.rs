//! User registry
//!
//! Maps usernames to the sensor slot ids holding their templates, backed
//! by a flat file: one `username<TAB>slot_id` record per line, no header.
//! The file is created empty if absent and rewritten in full after every
//! mutation. Mutations happen only after the sensor has confirmed the
//! corresponding enrollment or deletion.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use fpgate_types::{validate_username, UserRecord};

use crate::error::{Error, Result};

/// In-memory user registry with flat-file persistence
#[derive(Debug)]
pub struct UserRegistry {
    path: PathBuf,
    records: Vec<UserRecord>,
}

impl UserRegistry {
    /// Load the registry from `path`, creating empty storage if absent
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&path, "")?;
            debug!("Created empty registry at {}", path.display());

            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let text = fs::read_to_string(&path)?;
        let records = parse_records(&text, &path)?;

        debug!(
            "Loaded {} record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self { path, records })
    }

    /// Registry file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the registry has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in file order
    pub fn users(&self) -> &[UserRecord] {
        &self.records
    }

    /// Slot id the next enrollment will use
    ///
    /// Always `record_count + 1`; ids freed by deletion are not reclaimed.
    pub fn next_slot_id(&self) -> u32 {
        self.records.len() as u32 + 1
    }

    /// Find a record by username
    pub fn find(&self, username: &str) -> Option<&UserRecord> {
        self.records.iter().find(|r| r.username == username)
    }

    /// Find a record whose slot id matches a device-reported token
    ///
    /// The comparison is textual: the token comes straight off the wire.
    pub fn find_by_slot_token(&self, token: &str) -> Option<&UserRecord> {
        self.records
            .iter()
            .find(|r| r.slot_id.to_string() == token)
    }

    /// Add a record and rewrite the backing file
    pub fn add(&mut self, record: UserRecord) -> Result<()> {
        validate_username(&record.username)?;

        if self.find(&record.username).is_some() {
            return Err(fpgate_types::Error::Validation(format!(
                "username {:?} is already enrolled",
                record.username
            ))
            .into());
        }

        self.records.push(record);
        self.persist()
    }

    /// Remove the record for `username` and rewrite the backing file
    pub fn remove(&mut self, username: &str) -> Result<UserRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.username == username)
            .ok_or_else(|| {
                Error::from(fpgate_types::Error::Validation(format!(
                    "no user named {:?}",
                    username
                )))
            })?;

        let removed = self.records.remove(idx);
        self.persist()?;
        Ok(removed)
    }

    /// Rewrite the backing file from the in-memory records
    fn persist(&self) -> Result<()> {
        let mut out = String::with_capacity(self.records.len() * 16);
        for record in &self.records {
            out.push_str(&record.username);
            out.push('\t');
            out.push_str(&record.slot_id.to_string());
            out.push('\n');
        }

        fs::write(&self.path, out)?;
        debug!(
            "Rewrote {} with {} record(s)",
            self.path.display(),
            self.records.len()
        );
        Ok(())
    }
}

fn parse_records(text: &str, path: &Path) -> Result<Vec<UserRecord>> {
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }

        let (username, slot) = line.split_once('\t').ok_or_else(|| {
            fpgate_types::Error::Parse(format!(
                "{}:{}: expected two tab-separated columns",
                path.display(),
                idx + 1
            ))
        })?;

        let slot_id: u32 = slot.trim().parse().map_err(|_| {
            fpgate_types::Error::Parse(format!(
                "{}:{}: slot id {:?} is not a positive integer",
                path.display(),
                idx + 1,
                slot
            ))
        })?;

        records.push(UserRecord::new(username, slot_id));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.tsv");
        (dir, path)
    }

    #[test]
    fn test_load_creates_empty_storage() {
        let (_dir, path) = scratch();

        let registry = UserRegistry::load(&path).unwrap();
        assert!(registry.is_empty());
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_round_trip() {
        let (_dir, path) = scratch();

        let mut registry = UserRegistry::load(&path).unwrap();
        registry.add(UserRecord::new("alice", 1)).unwrap();
        registry.add(UserRecord::new("bob", 2)).unwrap();

        let reloaded = UserRegistry::load(&path).unwrap();
        assert_eq!(reloaded.users(), registry.users());
    }

    #[test]
    fn test_next_slot_id_is_count_plus_one() {
        let (_dir, path) = scratch();

        let mut registry = UserRegistry::load(&path).unwrap();
        assert_eq!(registry.next_slot_id(), 1);

        registry.add(UserRecord::new("alice", 1)).unwrap();
        assert_eq!(registry.next_slot_id(), 2);

        registry.add(UserRecord::new("bob", 2)).unwrap();
        registry.remove("alice").unwrap();

        // Freed ids are not reclaimed; the count rules
        assert_eq!(registry.next_slot_id(), 2);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (_dir, path) = scratch();

        let mut registry = UserRegistry::load(&path).unwrap();
        registry.add(UserRecord::new("alice", 1)).unwrap();

        let err = registry.add(UserRecord::new("alice", 2)).unwrap_err();
        assert!(matches!(
            err,
            Error::Types(fpgate_types::Error::Validation(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_leaves_others_untouched() {
        let (_dir, path) = scratch();

        let mut registry = UserRegistry::load(&path).unwrap();
        registry.add(UserRecord::new("alice", 1)).unwrap();
        registry.add(UserRecord::new("bob", 2)).unwrap();
        registry.add(UserRecord::new("carol", 3)).unwrap();

        let removed = registry.remove("bob").unwrap();
        assert_eq!(removed, UserRecord::new("bob", 2));

        let reloaded = UserRegistry::load(&path).unwrap();
        assert_eq!(
            reloaded.users(),
            &[UserRecord::new("alice", 1), UserRecord::new("carol", 3)]
        );
    }

    #[test]
    fn test_remove_unknown_user() {
        let (_dir, path) = scratch();

        let mut registry = UserRegistry::load(&path).unwrap();
        assert!(registry.remove("nobody").is_err());
    }

    #[test]
    fn test_slot_token_matching_is_textual() {
        let (_dir, path) = scratch();

        let mut registry = UserRegistry::load(&path).unwrap();
        registry.add(UserRecord::new("alice", 3)).unwrap();

        assert!(registry.find_by_slot_token("3").is_some());
        // Leading zeros on the wire do not match a numeric id
        assert!(registry.find_by_slot_token("03").is_none());
    }

    #[test]
    fn test_malformed_file_rejected() {
        let (_dir, path) = scratch();
        fs::write(&path, "alice no-tab-here\n").unwrap();

        let err = UserRegistry::load(&path).unwrap_err();
        assert!(matches!(err, Error::Types(fpgate_types::Error::Parse(_))));

        fs::write(&path, "alice\tnot-a-number\n").unwrap();
        let err = UserRegistry::load(&path).unwrap_err();
        assert!(matches!(err, Error::Types(fpgate_types::Error::Parse(_))));
    }
}
