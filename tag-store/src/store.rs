//! File-backed mapping store
//!
//! The whole document is a single JSON object keyed by tag id. Reads go to
//! disk every time so edits made by another process are picked up without a
//! restart; writes replace the file atomically via a sibling temp file.
//!
//! A record that does not decode is skipped with a warning and left in the
//! file untouched, so one bad hand edit does not hide every other tag.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::mapping::{MappingRecord, TagMapping};

/// Default file name used by the player
pub const DEFAULT_MAPPINGS_FILE: &str = "rfid_mappings.json";

/// Persistent tag → resource mapping store
#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    /// Open a store at `path`. The file does not need to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<BTreeMap<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn decode(&self, tag_id: &str, value: Value) -> Option<MappingRecord> {
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    tag = %tag_id,
                    path = %self.path.display(),
                    "Skipping unreadable mapping: {}",
                    e
                );
                None
            }
        }
    }

    fn write_raw(&self, records: &BTreeMap<String, Value>) -> Result<()> {
        let mut raw = serde_json::to_string_pretty(records).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        raw.push('\n');

        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    /// Load every mapping, keyed by tag id. A missing file is an empty store.
    pub fn load(&self) -> Result<BTreeMap<String, TagMapping>> {
        Ok(self
            .read_raw()?
            .into_iter()
            .filter_map(|(tag, value)| {
                let record = self.decode(&tag, value)?;
                Some((tag.clone(), TagMapping::from_record(tag, record)))
            })
            .collect())
    }

    /// All mappings ordered by tag id
    pub fn list(&self) -> Result<Vec<TagMapping>> {
        Ok(self.load()?.into_values().collect())
    }

    /// Look up a single tag
    pub fn get(&self, tag_id: &str) -> Result<Option<TagMapping>> {
        Ok(self
            .read_raw()?
            .remove(tag_id)
            .and_then(|value| self.decode(tag_id, value))
            .map(|record| TagMapping::from_record(tag_id.to_string(), record)))
    }

    /// Insert or replace a mapping. The last write for a tag id wins.
    pub fn insert(&self, mapping: &TagMapping) -> Result<()> {
        if mapping.tag_id.trim().is_empty() || mapping.resource_uri.trim().is_empty() {
            return Err(StoreError::InvalidMapping(
                "tag id and resource URI are required".to_string(),
            ));
        }

        let record = serde_json::to_value(mapping.to_record()).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut records = self.read_raw()?;
        let replaced = records.insert(mapping.tag_id.clone(), record).is_some();
        self.write_raw(&records)?;

        tracing::info!(
            tag = %mapping.tag_id,
            uri = %mapping.resource_uri,
            replaced,
            "Saved tag mapping"
        );
        Ok(())
    }

    /// Remove a mapping, returning whether it existed
    pub fn remove(&self, tag_id: &str) -> Result<bool> {
        let mut records = self.read_raw()?;
        if records.remove(tag_id).is_none() {
            return Ok(false);
        }
        self.write_raw(&records)?;
        tracing::info!(tag = %tag_id, "Removed tag mapping");
        Ok(true)
    }
}
