//! End-to-end planner scenarios through the public library API.

use matura_plan::buckets::build_board;
use matura_plan::view::{dashboard_view, list_view};
use matura_plan::{
    Action, Dataset, FileStore, FilterCriteria, KeyValueStore, MemoryStore, Planner, SlotNames,
    Store, Subject, ViewOptions,
};
use tempfile::TempDir;

fn single_task() -> Dataset {
    Dataset::from_json_str(
        r#"{"tasks": [{"id": "t1", "subject": "biologia", "section": "Komórka", "items": ["a", "b"], "defaultBucket": "unassigned"}]}"#,
    )
    .unwrap()
}

fn two_weeks() -> Dataset {
    Dataset::from_json_str(
        r#"{
        "tasks": [
            {"id": "pl-1", "subject": "polski", "section": "Barok", "items": ["Sęp-Szarzyński"], "month": 11},
            {"id": "en-1", "subject": "angielski", "section": "Tenses", "items": ["present", "past"], "tags": ["grammar"], "defaultBucket": "w1"}
        ],
        "monthBuckets": [{"key": "m11", "label": "Listopad"}],
        "weeks": [{"key": "w1", "label": "Tydzień 1"}, {"key": "w2", "label": "Tydzień 2"}]
    }"#,
    )
    .unwrap()
}

#[test]
fn test_single_task_toggle_scenario() {
    let mut planner = Planner::open(
        single_task(),
        Store::new(MemoryStore::new()),
        SlotNames::default(),
    )
    .unwrap();

    planner.dispatch(Action::toggle("t1", 0)).unwrap();

    let dashboard = dashboard_view(planner.dataset(), planner.snapshot(), &ViewOptions::default());
    let bio = dashboard
        .subjects
        .iter()
        .find(|s| s.subject == "biologia")
        .unwrap();
    assert_eq!((bio.done, bio.total), (1, 2));

    let cards = list_view(planner.dataset(), planner.snapshot());
    assert_eq!(cards[0].percent, 50);
}

#[test]
fn test_import_progress_only_scenario() {
    let slots = SlotNames::default();
    let store = Store::new(
        MemoryStore::new()
            .with_slot(&slots.buckets, r#"{"t1":"custom:unassigned"}"#)
            .with_slot(&slots.progress, r#"{"t1::1":true}"#),
    );
    let mut planner = Planner::open(single_task(), store, slots.clone()).unwrap();

    planner
        .dispatch(Action::Import(r#"{"progress":{"t1::0":true}}"#.to_string()))
        .unwrap();

    let backend = planner.store().backend();
    assert_eq!(
        backend.get(&slots.progress).unwrap().as_deref(),
        Some(r#"{"t1::0":true}"#)
    );
    assert_eq!(
        backend.get(&slots.buckets).unwrap().as_deref(),
        Some(r#"{"t1":"custom:unassigned"}"#)
    );
}

#[test]
fn test_each_filter_clause_independently() {
    let data = two_weeks();
    let snapshot_for = |criteria: FilterCriteria| {
        let mut planner =
            Planner::open(data.clone(), Store::new(MemoryStore::new()), SlotNames::default())
                .unwrap();
        planner.dispatch(Action::SetFilter(criteria)).unwrap();
        list_view(planner.dataset(), planner.snapshot())
            .into_iter()
            .map(|c| c.id)
            .collect::<Vec<_>>()
    };

    assert_eq!(snapshot_for(FilterCriteria::all()), vec!["pl-1", "en-1"]);
    assert_eq!(
        snapshot_for(FilterCriteria::all().with_subject(Subject::Polski)),
        vec!["pl-1"]
    );
    assert_eq!(snapshot_for(FilterCriteria::all().with_month(11)), vec!["pl-1"]);
    assert_eq!(
        snapshot_for(FilterCriteria::all().with_tag("grammar")),
        vec!["en-1"]
    );
    assert_eq!(
        snapshot_for(FilterCriteria::all().with_query("PAST")),
        vec!["en-1"]
    );
    assert!(snapshot_for(FilterCriteria::all().with_month(11).with_tag("grammar")).is_empty());
}

#[test]
fn test_reassign_moves_card_between_columns() {
    let mut planner =
        Planner::open(two_weeks(), Store::new(MemoryStore::new()), SlotNames::default()).unwrap();

    let counts = |planner: &Planner<MemoryStore>| {
        let snapshot = planner.snapshot();
        build_board(planner.dataset(), &snapshot.filters, &snapshot.buckets)
            .iter()
            .map(|c| (c.key.to_string(), c.tasks.len()))
            .collect::<Vec<_>>()
    };

    assert_eq!(
        counts(&planner),
        vec![
            ("unassigned".to_string(), 1),
            ("m11".to_string(), 0),
            ("w1".to_string(), 1),
            ("w2".to_string(), 0)
        ]
    );

    planner.dispatch(Action::reassign("en-1", "w2")).unwrap();
    assert_eq!(
        counts(&planner),
        vec![
            ("unassigned".to_string(), 1),
            ("m11".to_string(), 0),
            ("w1".to_string(), 0),
            ("w2".to_string(), 1)
        ]
    );
}

#[test]
fn test_state_survives_reopen_on_disk() {
    let temp = TempDir::new().unwrap();
    let slots = SlotNames::default();

    {
        let store = Store::new(FileStore::new(temp.path()));
        let mut planner = Planner::open(two_weeks(), store, slots.clone()).unwrap();
        planner.dispatch(Action::toggle("en-1", 1)).unwrap();
        planner.dispatch(Action::reassign("pl-1", "m11")).unwrap();
    }

    let store = Store::new(FileStore::new(temp.path()));
    let planner = Planner::open(two_weeks(), store, slots).unwrap();
    assert!(planner.snapshot().progress.is_done("en-1", 1));
    assert_eq!(planner.snapshot().buckets.get("pl-1"), Some("m11"));
}

#[test]
fn test_export_import_fidelity_on_disk() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();
    let slots = SlotNames::default();

    let mut source = Planner::open(
        two_weeks(),
        Store::new(FileStore::new(source_dir.path())),
        slots.clone(),
    )
    .unwrap();
    source.dispatch(Action::toggle("pl-1", 0)).unwrap();
    source.dispatch(Action::reassign("en-1", "m11")).unwrap();
    let exported = source.export();

    let mut target = Planner::open(
        two_weeks(),
        Store::new(FileStore::new(target_dir.path())),
        slots,
    )
    .unwrap();
    target
        .dispatch(Action::Import(exported.to_json_pretty().unwrap()))
        .unwrap();

    assert_eq!(target.snapshot().progress, exported.progress);
    assert_eq!(target.snapshot().buckets, exported.buckets);
}
