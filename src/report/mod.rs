pub mod delta;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ProgramId, Variant};
use crate::types::{ParsedRecord, RecordSet};

pub use delta::Delta;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramRow {
    pub program: ProgramId,
    pub label: String,
    pub max_count: u32,
    pub current_count: u32,
    pub accepted_score: Option<u32>,
    pub delta: Delta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramFailure {
    pub program: ProgramId,
    pub label: String,
    pub reason: String,
}

/// Everything a renderer needs: rows in program order plus the programs that
/// could not be parsed this run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignReport {
    pub variant: Variant,
    pub rows: Vec<ProgramRow>,
    pub failures: Vec<ProgramFailure>,
}

impl CampaignReport {
    pub fn build(
        catalog: &Catalog,
        variant: Variant,
        current: &RecordSet,
        previous: Option<&RecordSet>,
        failures: &[(ProgramId, String)],
    ) -> Self {
        let rows = current
            .iter()
            .map(|record| build_row(catalog, variant, record, previous))
            .collect();
        let failures = failures
            .iter()
            .map(|(program, reason)| ProgramFailure {
                program: *program,
                label: catalog.short_label(*program).to_string(),
                reason: reason.clone(),
            })
            .collect();
        Self {
            variant,
            rows,
            failures,
        }
    }

    pub fn changed_count(&self) -> usize {
        self.rows.iter().filter(|r| r.delta.is_change()).count()
    }
}

fn build_row(
    catalog: &Catalog,
    variant: Variant,
    record: &ParsedRecord,
    previous: Option<&RecordSet>,
) -> ProgramRow {
    let baseline = previous.and_then(|set| set.get(record.program));
    ProgramRow {
        program: record.program,
        label: catalog.short_label(record.program).to_string(),
        max_count: record.max_count,
        current_count: record.current_count,
        accepted_score: if variant.tracks_score() {
            Some(record.accepted_score.unwrap_or(0))
        } else {
            None
        },
        delta: Delta::between(baseline, record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_baseline_by_program_not_position() {
        let catalog = Catalog::for_variant(Variant::Extended);
        let current = RecordSet::try_from(vec![
            ParsedRecord::new(ProgramId::IiIt01, 8, 40).with_score(250),
            ParsedRecord::new(ProgramId::FitWeb, 4, 20).with_score(230),
        ])
        .unwrap();
        let previous = RecordSet::try_from(vec![
            ParsedRecord::new(ProgramId::FitWeb, 6, 20),
            ParsedRecord::new(ProgramId::FitSapr, 1, 10),
        ])
        .unwrap();
        let report = CampaignReport::build(
            &catalog,
            Variant::Extended,
            &current,
            Some(&previous),
            &[(ProgramId::FitSapr, "summary list not found".to_string())],
        );
        assert_eq!(report.rows[0].delta, Delta::NoBaseline);
        assert_eq!(report.rows[1].delta, Delta::Decreased(2));
        assert_eq!(report.changed_count(), 1);
        assert_eq!(report.failures[0].label, "09.03.01.02 (САПР)");
    }

    #[test]
    fn base_variant_drops_score() {
        let catalog = Catalog::for_variant(Variant::Base);
        let current =
            RecordSet::try_from(vec![ParsedRecord::new(ProgramId::IiIt02, 3, 15)]).unwrap();
        let report = CampaignReport::build(&catalog, Variant::Base, &current, None, &[]);
        assert_eq!(report.rows[0].accepted_score, None);
        assert_eq!(report.rows[0].label, "09.03.02.02 (ИСиТ ОЦК)");
    }
}
