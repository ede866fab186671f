use std::fs;
use std::sync::Arc;

use admission_campaign::catalog::{Catalog, ProgramId, Variant};
use admission_campaign::output::{RenderOptions, ReportFormat};
use admission_campaign::pipeline::{run_campaign, RunSettings};
use admission_campaign::portal::StaticSource;
use admission_campaign::report::Delta;
use admission_campaign::snapshot::SnapshotStore;
use admission_campaign::types::{ParsedRecord, RecordSet};

fn rating_page(capacity: u32, current: u32, scores: &[(u32, bool)]) -> String {
    let items = (0..9)
        .map(|i| match i {
            1 => format!("<li>Количество мест: {capacity}</li>"),
            7 => format!("<li>Подано согласий: {current}</li>"),
            _ => "<li>—</li>".to_string(),
        })
        .collect::<String>();
    let rows = scores
        .iter()
        .map(|(score, agreed)| {
            let cells = (0..17)
                .map(|idx| match idx {
                    14 => format!("<td>{score}</td>"),
                    16 => format!("<td>{}</td>", if *agreed { "да " } else { "нет" }),
                    _ => "<td>x</td>".to_string(),
                })
                .collect::<String>();
            format!("<tr>{cells}</tr>")
        })
        .collect::<String>();
    format!(
        "<html><body><ul>{items}</ul><div id=\"div4\">\n<table>{rows}</table></div></body></html>"
    )
}

fn settings(dir: &tempfile::TempDir, variant: Variant) -> RunSettings {
    RunSettings {
        variant,
        format: ReportFormat::Line,
        options: RenderOptions::default(),
        message_path: dir.path().join("MessageContent.txt"),
    }
}

#[tokio::test]
async fn first_run_without_snapshot_writes_fresh_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path().join("ParsedData.json"));
    let catalog = Catalog::for_variant(Variant::Base).restrict(&[ProgramId::IiIt01]);
    let source = StaticSource::new().with_page(ProgramId::IiIt01, rating_page(40, 5, &[]));

    let outcome = run_campaign(
        Arc::new(source),
        &catalog,
        &store,
        &settings(&dir, Variant::Base),
    )
    .await
    .unwrap();

    assert_eq!(outcome.report.rows[0].delta, Delta::NoBaseline);
    assert_eq!(
        outcome.message,
        "09.03.02.01 (ИСиТ): 5 согласий на 40 бюджетных мест\n"
    );
    let saved = store.read().unwrap().expect("snapshot should be written");
    assert_eq!(saved.get(ProgramId::IiIt01).unwrap().current_count, 5);
    let message = fs::read_to_string(dir.path().join("MessageContent.txt")).unwrap();
    assert_eq!(message, outcome.message);
}

#[tokio::test]
async fn second_run_reports_increase_then_no_change() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path().join("ParsedData.json"));
    store
        .save(
            &RecordSet::try_from(vec![
                ParsedRecord::new(ProgramId::FitWeb, 5, 2).with_score(230)
            ])
            .unwrap(),
        )
        .unwrap();
    let catalog = Catalog::for_variant(Variant::Extended).restrict(&[ProgramId::FitWeb]);
    let page = rating_page(2, 8, &[(281, true), (279, false), (266, true), (250, true)]);
    let run_settings = settings(&dir, Variant::Extended);

    let source = StaticSource::new().with_page(ProgramId::FitWeb, page.clone());
    let first = run_campaign(Arc::new(source), &catalog, &store, &run_settings)
        .await
        .unwrap();
    assert_eq!(
        first.message,
        "09.03.01.01 (Веб): 8 согласий на 2 бюджетных мест (+3), проходной балл 266\n"
    );

    let source = StaticSource::new().with_page(ProgramId::FitWeb, page);
    let second = run_campaign(Arc::new(source), &catalog, &store, &run_settings)
        .await
        .unwrap();
    assert_eq!(second.report.rows[0].delta, Delta::Unchanged);
    assert!(!second.message.contains("(+"));
    assert!(!second.message.contains("(-"));
}

#[tokio::test]
async fn partial_failure_still_completes_and_keeps_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path().join("ParsedData.json"));
    store
        .save(
            &RecordSet::try_from(vec![
                ParsedRecord::new(ProgramId::IiIt01, 10, 40),
                ParsedRecord::new(ProgramId::IiIt02, 4, 12),
            ])
            .unwrap(),
        )
        .unwrap();
    let catalog = Catalog::for_variant(Variant::Base)
        .restrict(&[ProgramId::IiIt01, ProgramId::IiIt02]);
    let source = StaticSource::new()
        .with_page(ProgramId::IiIt01, rating_page(40, 7, &[]))
        .with_page(ProgramId::IiIt02, "<html><body>Ошибка</body></html>");
    let mut run_settings = settings(&dir, Variant::Base);
    run_settings.format = ReportFormat::Table;

    let outcome = run_campaign(Arc::new(source), &catalog, &store, &run_settings)
        .await
        .unwrap();

    assert_eq!(outcome.report.rows.len(), 1);
    assert_eq!(outcome.report.failures.len(), 1);
    assert!(outcome.message.contains("| (-3) "));
    assert!(outcome
        .message
        .contains("[ERROR] 09.03.02.02 (ИСиТ ОЦК): summary list not found"));

    let saved = store.read().unwrap().unwrap();
    assert_eq!(saved.get(ProgramId::IiIt01).unwrap().current_count, 7);
    assert_eq!(saved.get(ProgramId::IiIt02).unwrap().current_count, 4);
}
