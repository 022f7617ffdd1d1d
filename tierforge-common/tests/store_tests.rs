//! Corpus store contract tests, run against both store implementations

use std::sync::Arc;
use tierforge_common::models::{
    ItemAction, ItemTransaction, MatchRecord, ObjectiveEvent, ObjectiveKind, Outcome,
    PerformanceMetrics, PerkSummary, Role, RosterEntry, Side, TeamObjectives, TimelineEvent,
    VisionDeviceEvent, WardAction, NONE_ID,
};
use tierforge_common::{CorpusStore, MemoryStore, SqliteStore, TimelineBatch};

fn record(match_id: &str, participant_id: u32) -> MatchRecord {
    let side = if participant_id <= 5 { Side::Blue } else { Side::Red };
    MatchRecord {
        match_id: match_id.to_string(),
        participant_id,
        entity_id: format!("puuid-{participant_id}"),
        version: "14.1.553.1234".to_string(),
        duration_seconds: 1800,
        side,
        outcome: if side == Side::Blue { Outcome::Win } else { Outcome::Loss },
        role: Some(Role::ALL[((participant_id - 1) % 5) as usize]),
        lane: "TOP".to_string(),
        champion_id: 100 + participant_id as i64,
        champion: format!("Champ{participant_id}"),
        metrics: PerformanceMetrics {
            kills: 3,
            kda: 2.5,
            ..Default::default()
        },
        items: [3153, 3006, 0, 0, 0, 0, 3340],
        perks: PerkSummary::default(),
        spells: [4, 14],
        team_objectives: TeamObjectives {
            dragon: 2,
            baron: 1,
            horde: 3,
            first_blood: side == Side::Blue,
        },
        bans: [1, 2, 3, 4, 5, 6, 7, NONE_ID, NONE_ID, NONE_ID],
    }
}

fn match_rows(match_id: &str) -> Vec<MatchRecord> {
    (1..=10).map(|p| record(match_id, p)).collect()
}

async fn sqlite_store() -> (tempfile::TempDir, Arc<dyn CorpusStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("corpus.db")).await.unwrap();
    (dir, Arc::new(store))
}

async fn check_match_batches_are_idempotent(store: Arc<dyn CorpusStore>) {
    let mut batch = match_rows("KR_1");
    batch.extend(match_rows("KR_2"));

    assert_eq!(store.append_match_batch(&batch).await.unwrap(), 2);
    // Replaying the same page adds nothing
    assert_eq!(store.append_match_batch(&batch).await.unwrap(), 0);

    let mut overlap = match_rows("KR_2");
    overlap.extend(match_rows("KR_3"));
    assert_eq!(store.append_match_batch(&overlap).await.unwrap(), 1);

    let ids = store.collected_ids().await.unwrap();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains("KR_3"));

    let records = store.load_match_records().await.unwrap();
    assert_eq!(records.len(), 30);
}

async fn check_record_fields_survive(store: Arc<dyn CorpusStore>) {
    let original = match_rows("KR_9");
    store.append_match_batch(&original).await.unwrap();

    let loaded = store.load_match_records().await.unwrap();
    let first = loaded
        .iter()
        .find(|r| r.participant_id == 1)
        .expect("participant 1 stored");
    assert_eq!(first, &original[0]);
    assert_eq!(first.bans[9], NONE_ID);
}

fn timeline_events(match_id: &str) -> Vec<TimelineEvent> {
    vec![
        TimelineEvent::ItemTransaction(ItemTransaction {
            match_id: match_id.to_string(),
            timestamp_ms: 1_000,
            participant_id: 1,
            item_id: 1055,
            action: ItemAction::Purchased,
        }),
        TimelineEvent::Objective(ObjectiveEvent {
            match_id: match_id.to_string(),
            timestamp_ms: 600_000,
            kind: ObjectiveKind::EliteMonster,
            subtype: Some("FIRE_DRAGON".to_string()),
            team_id: Some(100),
            lane: None,
        }),
        TimelineEvent::VisionDevice(VisionDeviceEvent {
            match_id: match_id.to_string(),
            timestamp_ms: 90_000,
            action: WardAction::Placed,
            ward_type: Some("YELLOW_TRINKET".to_string()),
            participant_id: Some(3),
            position: None,
        }),
    ]
}

async fn check_timeline_batches_mark_after_write(store: Arc<dyn CorpusStore>) {
    let mut batch = TimelineBatch::new();
    batch.push_match("KR_1".to_string(), timeline_events("KR_1"));
    batch.push_match("KR_2".to_string(), Vec::new());

    assert_eq!(store.append_timeline_batch(&batch).await.unwrap(), 2);
    // Re-writing a done batch neither duplicates events nor re-marks
    assert_eq!(store.append_timeline_batch(&batch).await.unwrap(), 0);

    let done = store.timeline_done_ids().await.unwrap();
    assert!(done.contains("KR_1"));
    // A match without events still counts as done
    assert!(done.contains("KR_2"));

    let events = store.load_timeline_events().await.unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.match_id() == "KR_1"));
}

async fn check_roster_replaced(store: Arc<dyn CorpusStore>) {
    let entry = |rank: u32, id: &str| RosterEntry {
        rank,
        entity_id: id.to_string(),
        display_name: id.to_uppercase(),
        score: 2000 - rank as i64,
        tier_label: "CHALLENGER".to_string(),
        wins: 100,
        losses: 80,
    };

    store
        .replace_roster(&[entry(1, "a"), entry(2, "b")])
        .await
        .unwrap();
    store.replace_roster(&[entry(1, "c")]).await.unwrap();

    let roster = store.load_roster().await.unwrap();
    assert_eq!(roster, vec![entry(1, "c")]);
}

#[tokio::test]
async fn test_memory_store_match_batches() {
    check_match_batches_are_idempotent(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_sqlite_store_match_batches() {
    let (_dir, store) = sqlite_store().await;
    check_match_batches_are_idempotent(store).await;
}

#[tokio::test]
async fn test_memory_store_record_fields() {
    check_record_fields_survive(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_sqlite_store_record_fields() {
    let (_dir, store) = sqlite_store().await;
    check_record_fields_survive(store).await;
}

#[tokio::test]
async fn test_memory_store_timeline_batches() {
    check_timeline_batches_mark_after_write(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_sqlite_store_timeline_batches() {
    let (_dir, store) = sqlite_store().await;
    check_timeline_batches_mark_after_write(store).await;
}

#[tokio::test]
async fn test_memory_store_roster() {
    check_roster_replaced(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_sqlite_store_roster() {
    let (_dir, store) = sqlite_store().await;
    check_roster_replaced(store).await;
}

#[tokio::test]
async fn test_sqlite_store_reopens_existing_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.db");

    {
        let store = SqliteStore::open(&path).await.unwrap();
        store.append_match_batch(&match_rows("KR_1")).await.unwrap();
        store.pool().close().await;
    }

    let store = SqliteStore::open(&path).await.unwrap();
    let ids = store.collected_ids().await.unwrap();
    assert!(ids.contains("KR_1"));
}
