use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::RecordSet;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed reading snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing snapshot {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub const MISSING_WARNING: &str = "[WARNING] Can't find saved data, abort.";
pub const CORRUPT_WARNING: &str = "[WARNING] Can't parse saved data, abort.";

/// Single JSON document holding the previous run's records.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn read(&self) -> Result<Option<RecordSet>, SnapshotError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SnapshotError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| SnapshotError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Previous baseline, or the `[WARNING]` line to show the operator when
    /// there is none to compare against.
    pub fn baseline(&self) -> Result<RecordSet, &'static str> {
        match self.read() {
            Ok(Some(set)) => {
                info!(
                    "loaded {} baseline records from {}",
                    set.len(),
                    self.path.display()
                );
                Ok(set)
            }
            Ok(None) => {
                warn!("snapshot not found: {}", self.path.display());
                Err(MISSING_WARNING)
            }
            Err(err) => {
                warn!("{err}");
                Err(CORRUPT_WARNING)
            }
        }
    }

    /// Previous baseline, if usable. A missing or unreadable file is reported
    /// on stdout and treated as no baseline.
    pub fn load(&self) -> Option<RecordSet> {
        match self.baseline() {
            Ok(set) => Some(set),
            Err(warning) => {
                println!("{warning}");
                None
            }
        }
    }

    /// Replaces the stored snapshot with `records`.
    pub fn save(&self, records: &RecordSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed creating snapshot directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string(records).context("failed serializing snapshot")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed writing snapshot: {}", self.path.display()))?;
        debug!("wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::catalog::{ProgramId, Variant};
    use crate::parser::parse_html;
    use crate::types::ParsedRecord;

    fn sample() -> RecordSet {
        RecordSet::try_from(vec![
            ParsedRecord::new(ProgramId::IiIt01, 12, 40).with_score(241),
            ParsedRecord::new(ProgramId::FitCorpis, 3, 25).with_score(0),
        ])
        .unwrap()
        .with_captured_at(Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn round_trips_record_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("ParsedData.json"));
        store.save(&sample()).unwrap();
        let loaded = store.read().unwrap().expect("snapshot missing");
        assert_eq!(loaded, sample());
    }

    #[test]
    fn below_quota_page_round_trips() {
        let html = format!(
            "<ul>{}</ul><div id=\"div4\"><table><tr>{}</tr></table></div>",
            (0..9)
                .map(|i| match i {
                    1 => "<li>Мест: 5</li>".to_string(),
                    7 => "<li>Подано: 1</li>".to_string(),
                    _ => "<li>-</li>".to_string(),
                })
                .collect::<String>(),
            (0..17)
                .map(|i| if i == 16 { "<td>да </td>" } else { "<td>250</td>" })
                .collect::<String>()
        );
        let page = parse_html(ProgramId::FitWeb, &html, Variant::Extended).unwrap();
        assert!(page.below_quota);
        assert_eq!(page.record, ParsedRecord::new(ProgramId::FitWeb, 1, 5).with_score(0));

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("ParsedData.json"));
        let saved = RecordSet::try_from(vec![page.record]).unwrap();
        store.save(&saved).unwrap();
        assert_eq!(store.read().unwrap(), Some(saved));
    }

    #[test]
    fn missing_file_is_no_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("absent.json"));
        assert!(store.read().unwrap().is_none());
        assert_eq!(
            store.baseline().unwrap_err(),
            "[WARNING] Can't find saved data, abort."
        );
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_is_error_on_read_and_absent_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ParsedData.json");
        fs::write(&path, "{ not json").unwrap();
        let store = SnapshotStore::open(&path);
        assert!(matches!(store.read(), Err(SnapshotError::Corrupt { .. })));
        assert_eq!(
            store.baseline().unwrap_err(),
            "[WARNING] Can't parse saved data, abort."
        );
        assert!(store.load().is_none());
    }

    #[test]
    fn save_overwrites_and_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("nested/state/ParsedData.json"));
        store.save(&sample()).unwrap();
        let replacement =
            RecordSet::try_from(vec![ParsedRecord::new(ProgramId::FitWeb, 1, 5)]).unwrap();
        store.save(&replacement).unwrap();
        let loaded = store.read().unwrap().unwrap();
        assert_eq!(loaded, replacement);
        assert!(loaded.get(ProgramId::IiIt01).is_none());
    }
}
