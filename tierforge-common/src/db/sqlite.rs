//! SQLite-backed corpus store

use super::schema::MATCH_RECORD_COLUMNS;
use super::store::{group_by_match, CorpusStore, TimelineBatch};
use crate::models::{
    AbilityLevelUp, Elimination, ItemTransaction, MatchRecord, ObjectiveEvent, Outcome,
    PerformanceMetrics, PerkSummary, Position, Role, RosterEntry, Side, TeamObjectives,
    TimelineEvent, VisionDeviceEvent, BAN_SLOTS, ITEM_SLOTS,
};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Corpus store over a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and prepare the schema
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = super::init::init_database(db_path).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn insert_record_sql() -> String {
    let placeholders = vec!["?"; MATCH_RECORD_COLUMNS.len()].join(", ");
    format!(
        "INSERT OR IGNORE INTO match_records ({}) VALUES ({})",
        MATCH_RECORD_COLUMNS.join(", "),
        placeholders
    )
}

async fn insert_record(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    r: &MatchRecord,
) -> Result<()> {
    let m = &r.metrics;
    let mut query = sqlx::query(sql)
        .bind(&r.match_id)
        .bind(r.participant_id as i64)
        .bind(&r.entity_id)
        .bind(&r.version)
        .bind(r.duration_seconds)
        .bind(r.side.as_str())
        .bind(r.outcome.is_win() as i64)
        .bind(r.champion_id)
        .bind(&r.champion)
        .bind(r.role.map(|role| role.as_str()))
        .bind(&r.lane)
        .bind(m.kills as i64)
        .bind(m.deaths as i64)
        .bind(m.assists as i64)
        .bind(m.kda)
        .bind(m.solo_kills as i64)
        .bind(m.total_damage)
        .bind(m.damage_taken)
        .bind(m.cs_total)
        .bind(m.gold_earned)
        .bind(m.vision_score)
        .bind(m.control_wards);
    for item in r.items {
        query = query.bind(item);
    }
    query = query
        .bind(r.perks.primary_style)
        .bind(r.perks.keystone)
        .bind(r.perks.secondary_style)
        .bind(r.spells[0])
        .bind(r.spells[1])
        .bind(r.team_objectives.dragon as i64)
        .bind(r.team_objectives.baron as i64)
        .bind(r.team_objectives.horde as i64)
        .bind(r.team_objectives.first_blood as i64);
    for ban in r.bans {
        query = query.bind(ban);
    }
    query.execute(&mut **tx).await?;
    Ok(())
}

fn record_from_row(row: &SqliteRow) -> Result<MatchRecord> {
    let side_str: String = row.try_get("team")?;
    let side = side_str.parse::<Side>().map_err(Error::InvalidInput)?;
    let position: Option<String> = row.try_get("position")?;
    let role = position.as_deref().and_then(Role::from_position);

    let mut items = [0i64; ITEM_SLOTS];
    for (slot, item) in items.iter_mut().enumerate() {
        *item = row.try_get(format!("item{slot}").as_str())?;
    }
    let mut bans = [0i64; BAN_SLOTS];
    for (slot, ban) in bans.iter_mut().enumerate() {
        *ban = row.try_get(format!("ban_{}", slot + 1).as_str())?;
    }

    let win: i64 = row.try_get("win")?;
    let participant_id: i64 = row.try_get("participant_id")?;

    Ok(MatchRecord {
        match_id: row.try_get("match_id")?,
        participant_id: participant_id as u32,
        entity_id: row.try_get("puuid")?,
        version: row.try_get("game_version")?,
        duration_seconds: row.try_get("game_duration")?,
        side,
        outcome: if win != 0 { Outcome::Win } else { Outcome::Loss },
        role,
        lane: row.try_get("lane")?,
        champion_id: row.try_get("champion_id")?,
        champion: row.try_get("champion")?,
        metrics: PerformanceMetrics {
            kills: row.try_get::<i64, _>("kills")? as u32,
            deaths: row.try_get::<i64, _>("deaths")? as u32,
            assists: row.try_get::<i64, _>("assists")? as u32,
            kda: row.try_get("kda")?,
            solo_kills: row.try_get::<i64, _>("solo_kills")? as u32,
            total_damage: row.try_get("total_damage")?,
            damage_taken: row.try_get("damage_taken")?,
            cs_total: row.try_get("cs_total")?,
            gold_earned: row.try_get("gold_earned")?,
            vision_score: row.try_get("vision_score")?,
            control_wards: row.try_get("control_wards")?,
        },
        items,
        perks: PerkSummary {
            primary_style: row.try_get("rune_main")?,
            keystone: row.try_get("rune_key")?,
            secondary_style: row.try_get("rune_sub")?,
        },
        spells: [row.try_get("spell1")?, row.try_get("spell2")?],
        team_objectives: TeamObjectives {
            dragon: row.try_get::<i64, _>("team_dragon")? as u32,
            baron: row.try_get::<i64, _>("team_baron")? as u32,
            horde: row.try_get::<i64, _>("team_horde")? as u32,
            first_blood: row.try_get::<i64, _>("first_blood")? != 0,
        },
        bans,
    })
}

async fn insert_event(tx: &mut Transaction<'_, Sqlite>, event: &TimelineEvent) -> Result<()> {
    match event {
        TimelineEvent::ItemTransaction(e) => {
            sqlx::query(
                "INSERT INTO timeline_items (match_id, timestamp, participant_id, item_id, type) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&e.match_id)
            .bind(e.timestamp_ms)
            .bind(e.participant_id)
            .bind(e.item_id)
            .bind(e.action.as_str())
            .execute(&mut **tx)
            .await?;
        }
        TimelineEvent::AbilityLevelUp(e) => {
            sqlx::query(
                "INSERT INTO timeline_skills (match_id, timestamp, participant_id, skill_slot, level_up_type) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&e.match_id)
            .bind(e.timestamp_ms)
            .bind(e.participant_id)
            .bind(e.skill_slot)
            .bind(&e.level_up_type)
            .execute(&mut **tx)
            .await?;
        }
        TimelineEvent::Elimination(e) => {
            sqlx::query(
                "INSERT INTO timeline_kills (match_id, timestamp, killer_id, victim_id, x, y) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&e.match_id)
            .bind(e.timestamp_ms)
            .bind(e.killer_id)
            .bind(e.victim_id)
            .bind(e.position.x)
            .bind(e.position.y)
            .execute(&mut **tx)
            .await?;
        }
        TimelineEvent::Objective(e) => {
            sqlx::query(
                "INSERT INTO timeline_objectives (match_id, timestamp, type, subtype, team_id, lane) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&e.match_id)
            .bind(e.timestamp_ms)
            .bind(e.kind.as_str())
            .bind(&e.subtype)
            .bind(e.team_id)
            .bind(&e.lane)
            .execute(&mut **tx)
            .await?;
        }
        TimelineEvent::VisionDevice(e) => {
            sqlx::query(
                "INSERT INTO timeline_wards (match_id, timestamp, type, ward_type, participant_id, x, y) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&e.match_id)
            .bind(e.timestamp_ms)
            .bind(e.action.as_str())
            .bind(&e.ward_type)
            .bind(e.participant_id)
            .bind(e.position.map(|p| p.x))
            .bind(e.position.map(|p| p.y))
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl CorpusStore for SqliteStore {
    async fn replace_roster(&self, entries: &[RosterEntry]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM roster").execute(&mut *tx).await?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO roster (rank_idx, puuid, summoner_name, lp, tier, wins, losses) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(entry.rank as i64)
            .bind(&entry.entity_id)
            .bind(&entry.display_name)
            .bind(entry.score)
            .bind(&entry.tier_label)
            .bind(entry.wins as i64)
            .bind(entry.losses as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!(entries = entries.len(), "Roster snapshot replaced");
        Ok(())
    }

    async fn load_roster(&self) -> Result<Vec<RosterEntry>> {
        let rows = sqlx::query(
            "SELECT rank_idx, puuid, summoner_name, lp, tier, wins, losses FROM roster ORDER BY rank_idx",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(RosterEntry {
                    rank: row.try_get::<i64, _>("rank_idx")? as u32,
                    entity_id: row.try_get("puuid")?,
                    display_name: row.try_get("summoner_name")?,
                    score: row.try_get("lp")?,
                    tier_label: row.try_get("tier")?,
                    wins: row.try_get::<i64, _>("wins")? as u32,
                    losses: row.try_get::<i64, _>("losses")? as u32,
                })
            })
            .collect()
    }

    async fn collected_ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT match_id FROM collected_matches")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn append_match_batch(&self, records: &[MatchRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let sql = insert_record_sql();
        let collected_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut new_matches = 0;

        for (match_id, group) in group_by_match(records) {
            let marked = sqlx::query(
                "INSERT OR IGNORE INTO collected_matches (match_id, collected_at) VALUES (?, ?)",
            )
            .bind(match_id)
            .bind(&collected_at)
            .execute(&mut *tx)
            .await?;

            // Present already: the batch is a replay of an earlier write
            if marked.rows_affected() == 0 {
                continue;
            }

            for record in group {
                insert_record(&mut tx, &sql, record).await?;
            }
            new_matches += 1;
        }

        tx.commit().await?;
        Ok(new_matches)
    }

    async fn load_match_records(&self) -> Result<Vec<MatchRecord>> {
        let sql = format!(
            "SELECT {} FROM match_records ORDER BY match_id, participant_id",
            MATCH_RECORD_COLUMNS.join(", ")
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn timeline_done_ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT match_id FROM timeline_done")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn append_timeline_batch(&self, batch: &TimelineBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let mut fresh: HashSet<&str> = HashSet::new();
        for id in &batch.match_ids {
            let done: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM timeline_done WHERE match_id = ?")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if done.is_none() {
                fresh.insert(id.as_str());
            }
        }

        for event in batch.events.iter().filter(|e| fresh.contains(e.match_id())) {
            insert_event(&mut tx, event).await?;
        }

        // Marks go in after the events so a resumed run never sees a
        // match as done without its rows.
        let done_at = Utc::now().to_rfc3339();
        for id in &fresh {
            sqlx::query("INSERT OR IGNORE INTO timeline_done (match_id, done_at) VALUES (?, ?)")
                .bind(*id)
                .bind(&done_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(fresh.len())
    }

    async fn load_timeline_events(&self) -> Result<Vec<TimelineEvent>> {
        let mut events = Vec::new();

        let items = sqlx::query(
            "SELECT match_id, timestamp, participant_id, item_id, type FROM timeline_items \
             ORDER BY match_id, timestamp, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &items {
            let kind: String = row.try_get("type")?;
            events.push(TimelineEvent::ItemTransaction(ItemTransaction {
                match_id: row.try_get("match_id")?,
                timestamp_ms: row.try_get("timestamp")?,
                participant_id: row.try_get("participant_id")?,
                item_id: row.try_get("item_id")?,
                action: kind.parse().map_err(Error::InvalidInput)?,
            }));
        }

        let skills = sqlx::query(
            "SELECT match_id, timestamp, participant_id, skill_slot, level_up_type FROM timeline_skills \
             ORDER BY match_id, timestamp, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &skills {
            events.push(TimelineEvent::AbilityLevelUp(AbilityLevelUp {
                match_id: row.try_get("match_id")?,
                timestamp_ms: row.try_get("timestamp")?,
                participant_id: row.try_get("participant_id")?,
                skill_slot: row.try_get("skill_slot")?,
                level_up_type: row.try_get("level_up_type")?,
            }));
        }

        let kills = sqlx::query(
            "SELECT match_id, timestamp, killer_id, victim_id, x, y FROM timeline_kills \
             ORDER BY match_id, timestamp, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &kills {
            events.push(TimelineEvent::Elimination(Elimination {
                match_id: row.try_get("match_id")?,
                timestamp_ms: row.try_get("timestamp")?,
                killer_id: row.try_get("killer_id")?,
                victim_id: row.try_get("victim_id")?,
                position: Position {
                    x: row.try_get("x")?,
                    y: row.try_get("y")?,
                },
            }));
        }

        let objectives = sqlx::query(
            "SELECT match_id, timestamp, type, subtype, team_id, lane FROM timeline_objectives \
             ORDER BY match_id, timestamp, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &objectives {
            let kind: String = row.try_get("type")?;
            events.push(TimelineEvent::Objective(ObjectiveEvent {
                match_id: row.try_get("match_id")?,
                timestamp_ms: row.try_get("timestamp")?,
                kind: kind.parse().map_err(Error::InvalidInput)?,
                subtype: row.try_get("subtype")?,
                team_id: row.try_get("team_id")?,
                lane: row.try_get("lane")?,
            }));
        }

        let wards = sqlx::query(
            "SELECT match_id, timestamp, type, ward_type, participant_id, x, y FROM timeline_wards \
             ORDER BY match_id, timestamp, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &wards {
            let kind: String = row.try_get("type")?;
            let x: Option<i64> = row.try_get("x")?;
            let y: Option<i64> = row.try_get("y")?;
            events.push(TimelineEvent::VisionDevice(VisionDeviceEvent {
                match_id: row.try_get("match_id")?,
                timestamp_ms: row.try_get("timestamp")?,
                action: kind.parse().map_err(Error::InvalidInput)?,
                ward_type: row.try_get("ward_type")?,
                participant_id: row.try_get("participant_id")?,
                position: x.zip(y).map(|(x, y)| Position { x, y }),
            }));
        }

        // Restore per-match time order across the five tables
        events.sort_by(|a, b| {
            a.match_id()
                .cmp(b.match_id())
                .then(a.timestamp_ms().cmp(&b.timestamp_ms()))
        });
        Ok(events)
    }
}
