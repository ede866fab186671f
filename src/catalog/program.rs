use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// One admissions track. Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgramId {
    IiIt01,
    IiIt02,
    IiIt03,
    IiIt04,
    FitWeb,
    FitSapr,
    FitPoit,
    FitCyberPhys,
    FitCorpis,
    FitBigData,
}

impl ProgramId {
    pub const ALL: [ProgramId; 10] = [
        ProgramId::IiIt01,
        ProgramId::IiIt02,
        ProgramId::IiIt03,
        ProgramId::IiIt04,
        ProgramId::FitWeb,
        ProgramId::FitSapr,
        ProgramId::FitPoit,
        ProgramId::FitCyberPhys,
        ProgramId::FitCorpis,
        ProgramId::FitBigData,
    ];

    pub const BASE: [ProgramId; 4] = [
        ProgramId::IiIt01,
        ProgramId::IiIt02,
        ProgramId::IiIt03,
        ProgramId::IiIt04,
    ];

    /// Name used in snapshot files and on the command line.
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::IiIt01 => "IiIT_01",
            Self::IiIt02 => "IiIT_02",
            Self::IiIt03 => "IiIT_03",
            Self::IiIt04 => "IiIT_04",
            Self::FitWeb => "FIT_Web",
            Self::FitSapr => "FIT_SAPR",
            Self::FitPoit => "FIT_POIT",
            Self::FitCyberPhys => "FIT_CyberPhys",
            Self::FitCorpis => "FIT_CORPIS",
            Self::FitBigData => "FIT_BigData",
        }
    }

    pub fn ordinal(&self) -> u32 {
        *self as u32
    }

    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }
}

impl Display for ProgramId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown program id: {0}")]
pub struct ProgramParseError(pub String);

impl FromStr for ProgramId {
    type Err = ProgramParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|id| id.as_slug().to_ascii_lowercase() == normalized)
            .ok_or_else(|| ProgramParseError(s.to_string()))
    }
}

// Snapshots store the ordinal; names are accepted on read as well.
impl Serialize for ProgramId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for ProgramId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ProgramIdVisitor)
    }
}

struct ProgramIdVisitor;

impl<'de> Visitor<'de> for ProgramIdVisitor {
    type Value = ProgramId;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a program ordinal or name")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        ProgramId::from_ordinal(v)
            .ok_or_else(|| E::custom(format!("program ordinal out of range: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("negative program ordinal: {v}")))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::ProgramId;

    #[test]
    fn parses_slugs_case_insensitively() {
        assert_eq!("fit_web".parse::<ProgramId>().unwrap(), ProgramId::FitWeb);
        assert_eq!("IiIT-03".parse::<ProgramId>().unwrap(), ProgramId::IiIt03);
        assert!("medicine".parse::<ProgramId>().is_err());
    }

    #[test]
    fn serializes_as_ordinal_and_reads_names() {
        let json = serde_json::to_string(&ProgramId::FitSapr).unwrap();
        assert_eq!(json, "5");
        let by_ordinal: ProgramId = serde_json::from_str("9").unwrap();
        assert_eq!(by_ordinal, ProgramId::FitBigData);
        let by_name: ProgramId = serde_json::from_str("\"FIT_POIT\"").unwrap();
        assert_eq!(by_name, ProgramId::FitPoit);
        assert!(serde_json::from_str::<ProgramId>("10").is_err());
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        for (idx, id) in ProgramId::ALL.iter().enumerate() {
            assert_eq!(id.ordinal() as usize, idx);
            assert_eq!(ProgramId::from_ordinal(idx as u64), Some(*id));
        }
    }
}
