use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ProgramId;

/// Raw portal answer for one program. Transport failures travel as data so
/// one broken request never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub program: ProgramId,
    pub payload: FetchPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPayload {
    Body(String),
    Failed(String),
}

impl FetchResult {
    pub fn body(program: ProgramId, body: impl Into<String>) -> Self {
        Self {
            program,
            payload: FetchPayload::Body(body.into()),
        }
    }

    pub fn failed(program: ProgramId, reason: impl Into<String>) -> Self {
        Self {
            program,
            payload: FetchPayload::Failed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.payload, FetchPayload::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedRecord {
    #[serde(rename = "Specialty")]
    pub program: ProgramId,
    pub max_count: u32,
    pub current_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_score: Option<u32>,
}

impl ParsedRecord {
    pub fn new(program: ProgramId, current_count: u32, max_count: u32) -> Self {
        Self {
            program,
            max_count,
            current_count,
            accepted_score: None,
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.accepted_score = Some(score);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate record for program {0}")]
pub struct RecordSetError(pub ProgramId);

/// Records keyed by program, kept in declaration order, one per program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(rename = "Data", deserialize_with = "deserialize_records")]
    records: Vec<ParsedRecord>,
    #[serde(
        rename = "CapturedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub captured_at: Option<DateTime<Utc>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: ParsedRecord) -> Result<(), RecordSetError> {
        match self
            .records
            .binary_search_by(|r| r.program.cmp(&record.program))
        {
            Ok(_) => Err(RecordSetError(record.program)),
            Err(pos) => {
                self.records.insert(pos, record);
                Ok(())
            }
        }
    }

    pub fn get(&self, program: ProgramId) -> Option<&ParsedRecord> {
        self.records
            .binary_search_by(|r| r.program.cmp(&program))
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn records(&self) -> &[ParsedRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn with_captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }
}

impl TryFrom<Vec<ParsedRecord>> for RecordSet {
    type Error = RecordSetError;

    fn try_from(records: Vec<ParsedRecord>) -> Result<Self, Self::Error> {
        let mut set = RecordSet::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }
}

fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<ParsedRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let records = Vec::<ParsedRecord>::deserialize(deserializer)?;
    RecordSet::try_from(records)
        .map(|set| set.records)
        .map_err(serde::de::Error::custom)
}
