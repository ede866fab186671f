pub mod program;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use program::{ProgramId, ProgramParseError};

pub const FORM_SELECT_KEY: &str = "select1";
pub const FORM_SELECT_VALUE: &str = "000000017_01";
pub const FORM_FINANCING_KEY: &str = "eduFin";
pub const FORM_FINANCING_VALUE: &str = "Бюджетная основа";
pub const FORM_SPEC_CODE_KEY: &str = "specCode";
pub const FORM_EDU_FORM_KEY: &str = "eduForm";

/// Which set of programs is polled and whether the accepted score is scraped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Base,
    #[default]
    Extended,
}

impl Variant {
    pub fn tracks_score(&self) -> bool {
        matches!(self, Self::Extended)
    }

    pub fn programs(&self) -> &'static [ProgramId] {
        match self {
            Self::Base => &ProgramId::BASE,
            Self::Extended => &ProgramId::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EduForm {
    FullTime,
    PartTime,
}

impl EduForm {
    pub fn form_value(&self) -> &'static str {
        match self {
            Self::FullTime => "Очная",
            Self::PartTime => "Заочная",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub program: ProgramId,
    pub title: &'static str,
    pub short_label: &'static str,
    pub edu_form: EduForm,
}

/// Immutable lookup table built once per run and handed to the requester and
/// the reporter.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: BTreeMap<ProgramId, CatalogEntry>,
}

impl Catalog {
    pub fn for_variant(variant: Variant) -> Self {
        let entries = variant
            .programs()
            .iter()
            .map(|id| (*id, entry_for(*id)))
            .collect();
        Self { entries }
    }

    /// Keeps only the listed programs. Ids outside the catalog are ignored.
    pub fn restrict(mut self, ids: &[ProgramId]) -> Self {
        self.entries.retain(|id, _| ids.contains(id));
        self
    }

    pub fn programs(&self) -> impl Iterator<Item = ProgramId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ProgramId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn entry(&self, id: ProgramId) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn title(&self, id: ProgramId) -> &'static str {
        self.entry(id).map(|e| e.title).unwrap_or_else(|| entry_for(id).title)
    }

    pub fn short_label(&self, id: ProgramId) -> &'static str {
        self.entry(id)
            .map(|e| e.short_label)
            .unwrap_or_else(|| entry_for(id).short_label)
    }

    pub fn form_fields(&self, id: ProgramId) -> Vec<(&'static str, &'static str)> {
        let entry = self.entry(id).cloned().unwrap_or_else(|| entry_for(id));
        vec![
            (FORM_SELECT_KEY, FORM_SELECT_VALUE),
            (FORM_FINANCING_KEY, FORM_FINANCING_VALUE),
            (FORM_SPEC_CODE_KEY, entry.title),
            (FORM_EDU_FORM_KEY, entry.edu_form.form_value()),
        ]
    }
}

fn entry_for(program: ProgramId) -> CatalogEntry {
    let (title, short_label) = match program {
        ProgramId::IiIt01 => (
            "09.03.02_Информационные системы и технологии (Информационные системы и технологии обработки цифрового контента; Информационные и автоматизированные системы обр",
            "09.03.02.01 (ИСиТ)",
        ),
        ProgramId::IiIt02 => (
            "09.03.02_Информационные системы и технологии обработки цифрового контента",
            "09.03.02.02 (ИСиТ ОЦК)",
        ),
        ProgramId::IiIt03 => (
            "09.03.02_Информационные системы автоматизированных комплексов медиаиндустрии",
            "09.03.02.03 (ИСАКМ)",
        ),
        ProgramId::IiIt04 => ("09.03.02_Цифровая трансформация", "09.03.02.04 (ЦТ)"),
        ProgramId::FitWeb => ("09.03.01_Веб-технологии", "09.03.01.01 (Веб)"),
        ProgramId::FitSapr => (
            "09.03.01_Интеграция и программирование в САПР",
            "09.03.01.02 (САПР)",
        ),
        ProgramId::FitPoit => (
            "09.03.01_Программное обеспечение информационных систем",
            "09.03.01.03 (ПОИС)",
        ),
        ProgramId::FitCyberPhys => ("09.03.01_Киберфизические системы", "09.03.01.04 (КФС)"),
        ProgramId::FitCorpis => (
            "09.03.03_Корпоративные информационные системы",
            "09.03.03.01 (КИС)",
        ),
        ProgramId::FitBigData => ("09.03.03_Большие и открытые данные", "09.03.03.02 (Биг дата)"),
    };
    let edu_form = match program {
        ProgramId::IiIt02 | ProgramId::FitPoit => EduForm::PartTime,
        _ => EduForm::FullTime,
    };
    CatalogEntry {
        program,
        title,
        short_label,
        edu_form,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_total_and_non_empty() {
        let catalog = Catalog::for_variant(Variant::Extended);
        assert_eq!(catalog.len(), ProgramId::ALL.len());
        for id in ProgramId::ALL {
            let entry = catalog.entry(id).expect("missing catalog entry");
            assert!(!entry.title.is_empty());
            assert!(!entry.short_label.is_empty());
            assert_eq!(catalog.title(id), entry.title);
            assert_eq!(catalog.short_label(id), entry.short_label);
        }
    }

    #[test]
    fn base_variant_holds_first_four_programs() {
        let catalog = Catalog::for_variant(Variant::Base);
        let ids = catalog.programs().collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                ProgramId::IiIt01,
                ProgramId::IiIt02,
                ProgramId::IiIt03,
                ProgramId::IiIt04
            ]
        );
        assert!(!Variant::Base.tracks_score());
    }

    #[test]
    fn part_time_programs_override_edu_form() {
        let catalog = Catalog::for_variant(Variant::Extended);
        let form = |id| {
            catalog
                .form_fields(id)
                .into_iter()
                .find(|(k, _)| *k == FORM_EDU_FORM_KEY)
                .map(|(_, v)| v)
        };
        assert_eq!(form(ProgramId::IiIt02), Some("Заочная"));
        assert_eq!(form(ProgramId::FitPoit), Some("Заочная"));
        assert_eq!(form(ProgramId::FitWeb), Some("Очная"));
    }

    #[test]
    fn form_fields_carry_common_keys_and_title() {
        let catalog = Catalog::for_variant(Variant::Extended);
        let fields = catalog.form_fields(ProgramId::FitBigData);
        assert_eq!(fields.len(), 4);
        assert!(fields.contains(&("select1", "000000017_01")));
        assert!(fields.contains(&("eduFin", "Бюджетная основа")));
        assert!(fields.contains(&("specCode", "09.03.03_Большие и открытые данные")));
    }

    #[test]
    fn restrict_keeps_declaration_order() {
        let catalog = Catalog::for_variant(Variant::Extended)
            .restrict(&[ProgramId::FitBigData, ProgramId::IiIt03]);
        let ids = catalog.programs().collect::<Vec<_>>();
        assert_eq!(ids, vec![ProgramId::IiIt03, ProgramId::FitBigData]);
        assert!(!catalog.contains(ProgramId::FitWeb));
    }
}
