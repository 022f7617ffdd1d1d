//! Timeline extraction
//!
//! Fetches the frame feed of every collected match that has no timeline yet
//! and decomposes it into typed events. Decoded matches are written in
//! batches; a match is marked done only by the write that stores its events.

use crate::client::dto::{EventDto, PositionDto, TimelineDto};
use crate::client::PacedSource;
use crate::error::{CollectError, Result, SourceError};
use std::sync::Arc;
use tierforge_common::models::{
    AbilityLevelUp, Elimination, ItemAction, ItemTransaction, ObjectiveEvent, ObjectiveKind,
    Position, TimelineEvent, VisionDeviceEvent, WardAction,
};
use tierforge_common::{CorpusStore, TimelineBatch};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineSummary {
    /// Matches without a timeline when the run started
    pub pending: usize,
    /// Matches newly marked done
    pub written: usize,
    pub events: usize,
    /// Matches left for a later run
    pub skipped: usize,
}

pub struct TimelineExtractor {
    source: PacedSource,
    store: Arc<dyn CorpusStore>,
    batch_size: usize,
}

impl TimelineExtractor {
    pub fn new(source: PacedSource, store: Arc<dyn CorpusStore>, batch_size: usize) -> Self {
        Self {
            source,
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn run(&self) -> Result<TimelineSummary> {
        let collected = self.store.collected_ids().await?;
        let done = self.store.timeline_done_ids().await?;
        let mut pending: Vec<String> = collected.difference(&done).cloned().collect();
        pending.sort();

        let mut summary = TimelineSummary {
            pending: pending.len(),
            ..Default::default()
        };
        info!(pending = pending.len(), done = done.len(), "Starting timeline extraction");

        let mut batch = TimelineBatch::new();
        for (i, match_id) in pending.iter().enumerate() {
            match self.extract(match_id).await {
                Ok(events) => batch.push_match(match_id.clone(), events),
                Err(e) if e.is_fatal() => {
                    error!(match_id = %match_id, error = %e, "Credential rejected, aborting timelines");
                    return Err(CollectError::Fatal(e));
                }
                Err(e) => {
                    warn!(match_id = %match_id, error = %e, "Skipping timeline");
                    summary.skipped += 1;
                }
            }

            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut summary).await?;
                info!(
                    progress = i + 1,
                    total = pending.len(),
                    "Timeline batch written"
                );
            }
        }
        self.flush(&mut batch, &mut summary).await?;

        info!(
            written = summary.written,
            events = summary.events,
            skipped = summary.skipped,
            "Timeline extraction complete"
        );
        Ok(summary)
    }

    async fn extract(&self, match_id: &str) -> std::result::Result<Vec<TimelineEvent>, SourceError> {
        let timeline = self.source.match_timeline(match_id).await?;
        decompose_timeline(match_id, &timeline)
    }

    async fn flush(&self, batch: &mut TimelineBatch, summary: &mut TimelineSummary) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let written = self.store.append_timeline_batch(batch).await?;
        summary.written += written;
        summary.events += batch.events.len();
        *batch = TimelineBatch::new();
        Ok(())
    }
}

/// Decompose a frame feed into typed events
///
/// Unknown event kinds are dropped. The result is ordered by timestamp;
/// events sharing a timestamp keep feed order.
pub fn decompose_timeline(
    match_id: &str,
    timeline: &TimelineDto,
) -> std::result::Result<Vec<TimelineEvent>, SourceError> {
    let info = timeline
        .info
        .as_ref()
        .ok_or_else(|| SourceError::Malformed(format!("timeline {match_id} has no frames")))?;

    let mut events: Vec<TimelineEvent> = info
        .frames
        .iter()
        .flat_map(|frame| {
            frame
                .events
                .iter()
                .filter_map(move |event| decode_event(match_id, frame.timestamp, event))
        })
        .collect();
    events.sort_by_key(TimelineEvent::timestamp_ms);
    Ok(events)
}

/// Map one upstream event onto a variant; `None` for kinds not collected
///
/// Events without their own timestamp take the frame's.
pub fn decode_event(match_id: &str, frame_timestamp: i64, event: &EventDto) -> Option<TimelineEvent> {
    let match_id = match_id.to_string();
    let timestamp_ms = event.timestamp().unwrap_or(frame_timestamp);

    let item = |action, participant_id, item_id| {
        TimelineEvent::ItemTransaction(ItemTransaction {
            match_id: match_id.clone(),
            timestamp_ms,
            participant_id,
            item_id,
            action,
        })
    };

    let decoded = match event {
        EventDto::ItemPurchased(e) => item(ItemAction::Purchased, e.participant_id, e.item_id),
        EventDto::ItemSold(e) => item(ItemAction::Sold, e.participant_id, e.item_id),
        EventDto::ItemDestroyed(e) => item(ItemAction::Destroyed, e.participant_id, e.item_id),
        EventDto::ItemUndo(e) => {
            // Undoing a purchase reports the item in before_id; undoing a sale in after_id
            let undone = if e.before_id != 0 {
                e.before_id
            } else {
                e.after_id
            };
            item(ItemAction::Undo, e.participant_id, undone)
        }
        EventDto::SkillLevelUp(e) => TimelineEvent::AbilityLevelUp(AbilityLevelUp {
            match_id: match_id.clone(),
            timestamp_ms,
            participant_id: e.participant_id,
            skill_slot: e.skill_slot,
            level_up_type: e.level_up_type.clone(),
        }),
        EventDto::ChampionKill(e) => TimelineEvent::Elimination(Elimination {
            match_id: match_id.clone(),
            timestamp_ms,
            killer_id: e.killer_id,
            victim_id: e.victim_id,
            position: position(e.position),
        }),
        EventDto::EliteMonsterKill(e) => {
            let subtype = match e.monster_type.as_deref() {
                Some("DRAGON") => Some(
                    e.monster_sub_type
                        .clone()
                        .unwrap_or_else(|| "DRAGON".to_string()),
                ),
                _ => e.monster_type.clone(),
            };
            TimelineEvent::Objective(ObjectiveEvent {
                match_id: match_id.clone(),
                timestamp_ms,
                kind: ObjectiveKind::EliteMonster,
                subtype,
                team_id: e.killer_team_id,
                lane: None,
            })
        }
        EventDto::BuildingKill(e) => TimelineEvent::Objective(ObjectiveEvent {
            match_id: match_id.clone(),
            timestamp_ms,
            kind: ObjectiveKind::Building,
            subtype: e.building_type.clone(),
            team_id: e.team_id,
            lane: e.lane_type.clone(),
        }),
        EventDto::TurretPlateDestroyed(e) => TimelineEvent::Objective(ObjectiveEvent {
            match_id: match_id.clone(),
            timestamp_ms,
            kind: ObjectiveKind::TurretPlate,
            subtype: Some("TURRET_PLATE".to_string()),
            team_id: e.team_id,
            lane: e.lane_type.clone(),
        }),
        EventDto::WardPlaced(e) => TimelineEvent::VisionDevice(VisionDeviceEvent {
            match_id: match_id.clone(),
            timestamp_ms,
            action: WardAction::Placed,
            ward_type: e.ward_type.clone(),
            participant_id: e.creator_id,
            position: e.position.map(position),
        }),
        EventDto::WardKill(e) => TimelineEvent::VisionDevice(VisionDeviceEvent {
            match_id: match_id.clone(),
            timestamp_ms,
            action: WardAction::Killed,
            ward_type: e.ward_type.clone(),
            participant_id: e.killer_id,
            position: e.position.map(position),
        }),
        EventDto::Unrecognized => return None,
    };
    Some(decoded)
}

fn position(p: PositionDto) -> Position {
    Position { x: p.x, y: p.y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timeline(frames: serde_json::Value) -> TimelineDto {
        serde_json::from_value(json!({ "info": { "frames": frames } })).unwrap()
    }

    #[test]
    fn test_missing_info_is_malformed() {
        let dto: TimelineDto = serde_json::from_value(json!({ "metadata": {} })).unwrap();
        assert!(matches!(
            decompose_timeline("KR_1", &dto),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_frame_timestamp_fallback() {
        let dto = timeline(json!([
            { "timestamp": 60000, "events": [
                { "type": "SKILL_LEVEL_UP", "participantId": 2, "skillSlot": 1, "levelUpType": "NORMAL" }
            ]}
        ]));
        let events = decompose_timeline("KR_1", &dto).unwrap();
        assert_eq!(events[0].timestamp_ms(), 60000);
    }

    #[test]
    fn test_events_sorted_within_match() {
        let dto = timeline(json!([
            { "timestamp": 0, "events": [
                { "type": "WARD_PLACED", "timestamp": 5000, "creatorId": 1, "wardType": "YELLOW_TRINKET" },
                { "type": "ITEM_PURCHASED", "timestamp": 1000, "participantId": 1, "itemId": 1055 }
            ]}
        ]));
        let events = decompose_timeline("KR_1", &dto).unwrap();
        let stamps: Vec<i64> = events.iter().map(TimelineEvent::timestamp_ms).collect();
        assert_eq!(stamps, vec![1000, 5000]);
    }

    #[test]
    fn test_dragon_subtype() {
        let dto = timeline(json!([
            { "timestamp": 0, "events": [
                { "type": "ELITE_MONSTER_KILL", "timestamp": 900000, "monsterType": "DRAGON",
                  "monsterSubType": "FIRE_DRAGON", "killerTeamId": 200, "killerId": 7 },
                { "type": "ELITE_MONSTER_KILL", "timestamp": 1500000, "monsterType": "BARON_NASHOR",
                  "killerTeamId": 100, "killerId": 2 }
            ]}
        ]));
        let events = decompose_timeline("KR_1", &dto).unwrap();
        match (&events[0], &events[1]) {
            (TimelineEvent::Objective(dragon), TimelineEvent::Objective(baron)) => {
                assert_eq!(dragon.subtype.as_deref(), Some("FIRE_DRAGON"));
                assert_eq!(dragon.team_id, Some(200));
                assert_eq!(baron.subtype.as_deref(), Some("BARON_NASHOR"));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
