//! Corpus schema: one append-only table per record kind, two checkpoint
//! tables, and the warehouse indexes used by downstream queries.

use crate::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Columns of `match_records` in insert order
pub const MATCH_RECORD_COLUMNS: &[&str] = &[
    "match_id",
    "participant_id",
    "puuid",
    "game_version",
    "game_duration",
    "team",
    "win",
    "champion_id",
    "champion",
    "position",
    "lane",
    "kills",
    "deaths",
    "assists",
    "kda",
    "solo_kills",
    "total_damage",
    "damage_taken",
    "cs_total",
    "gold_earned",
    "vision_score",
    "control_wards",
    "item0",
    "item1",
    "item2",
    "item3",
    "item4",
    "item5",
    "item6",
    "rune_main",
    "rune_key",
    "rune_sub",
    "spell1",
    "spell2",
    "team_dragon",
    "team_baron",
    "team_horde",
    "first_blood",
    "ban_1",
    "ban_2",
    "ban_3",
    "ban_4",
    "ban_5",
    "ban_6",
    "ban_7",
    "ban_8",
    "ban_9",
    "ban_10",
];

const TABLES: &[(&str, &str)] = &[
    (
        "roster",
        r#"
        CREATE TABLE IF NOT EXISTS roster (
            rank_idx INTEGER PRIMARY KEY,
            puuid TEXT NOT NULL UNIQUE,
            summoner_name TEXT NOT NULL,
            lp INTEGER NOT NULL,
            tier TEXT NOT NULL,
            wins INTEGER NOT NULL,
            losses INTEGER NOT NULL
        )
        "#,
    ),
    (
        "match_records",
        r#"
        CREATE TABLE IF NOT EXISTS match_records (
            match_id TEXT NOT NULL,
            participant_id INTEGER NOT NULL,
            puuid TEXT NOT NULL,
            game_version TEXT NOT NULL,
            game_duration INTEGER NOT NULL,
            team TEXT NOT NULL,
            win INTEGER NOT NULL,
            champion_id INTEGER NOT NULL,
            champion TEXT NOT NULL,
            position TEXT,
            lane TEXT NOT NULL,
            kills INTEGER NOT NULL,
            deaths INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            kda REAL NOT NULL,
            solo_kills INTEGER NOT NULL,
            total_damage INTEGER NOT NULL,
            damage_taken INTEGER NOT NULL,
            cs_total INTEGER NOT NULL,
            gold_earned INTEGER NOT NULL,
            vision_score INTEGER NOT NULL,
            control_wards INTEGER NOT NULL,
            item0 INTEGER NOT NULL,
            item1 INTEGER NOT NULL,
            item2 INTEGER NOT NULL,
            item3 INTEGER NOT NULL,
            item4 INTEGER NOT NULL,
            item5 INTEGER NOT NULL,
            item6 INTEGER NOT NULL,
            rune_main INTEGER NOT NULL,
            rune_key INTEGER NOT NULL,
            rune_sub INTEGER NOT NULL,
            spell1 INTEGER NOT NULL,
            spell2 INTEGER NOT NULL,
            team_dragon INTEGER NOT NULL,
            team_baron INTEGER NOT NULL,
            team_horde INTEGER NOT NULL,
            first_blood INTEGER NOT NULL,
            ban_1 INTEGER NOT NULL,
            ban_2 INTEGER NOT NULL,
            ban_3 INTEGER NOT NULL,
            ban_4 INTEGER NOT NULL,
            ban_5 INTEGER NOT NULL,
            ban_6 INTEGER NOT NULL,
            ban_7 INTEGER NOT NULL,
            ban_8 INTEGER NOT NULL,
            ban_9 INTEGER NOT NULL,
            ban_10 INTEGER NOT NULL,
            PRIMARY KEY (match_id, participant_id)
        )
        "#,
    ),
    (
        "collected_matches",
        r#"
        CREATE TABLE IF NOT EXISTS collected_matches (
            match_id TEXT PRIMARY KEY,
            collected_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "timeline_items",
        r#"
        CREATE TABLE IF NOT EXISTS timeline_items (
            match_id TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            participant_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            type TEXT NOT NULL
        )
        "#,
    ),
    (
        "timeline_skills",
        r#"
        CREATE TABLE IF NOT EXISTS timeline_skills (
            match_id TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            participant_id INTEGER NOT NULL,
            skill_slot INTEGER NOT NULL,
            level_up_type TEXT NOT NULL
        )
        "#,
    ),
    (
        "timeline_kills",
        r#"
        CREATE TABLE IF NOT EXISTS timeline_kills (
            match_id TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            killer_id INTEGER NOT NULL,
            victim_id INTEGER NOT NULL,
            x INTEGER NOT NULL,
            y INTEGER NOT NULL
        )
        "#,
    ),
    (
        "timeline_objectives",
        r#"
        CREATE TABLE IF NOT EXISTS timeline_objectives (
            match_id TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            type TEXT NOT NULL,
            subtype TEXT,
            team_id INTEGER,
            lane TEXT
        )
        "#,
    ),
    (
        "timeline_wards",
        r#"
        CREATE TABLE IF NOT EXISTS timeline_wards (
            match_id TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            type TEXT NOT NULL,
            ward_type TEXT,
            participant_id INTEGER,
            x INTEGER,
            y INTEGER
        )
        "#,
    ),
    (
        "timeline_done",
        r#"
        CREATE TABLE IF NOT EXISTS timeline_done (
            match_id TEXT PRIMARY KEY,
            done_at TEXT NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_match_records_match ON match_records (match_id)",
    "CREATE INDEX IF NOT EXISTS idx_match_records_champion ON match_records (champion_id)",
    "CREATE INDEX IF NOT EXISTS idx_match_records_position ON match_records (position)",
    "CREATE INDEX IF NOT EXISTS idx_match_records_duration ON match_records (game_duration)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_items_match ON timeline_items (match_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_items_item ON timeline_items (item_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_items_part ON timeline_items (participant_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_items_type ON timeline_items (type)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_skills_match ON timeline_skills (match_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_skills_part ON timeline_skills (participant_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_kills_match ON timeline_kills (match_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_objectives_match ON timeline_objectives (match_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_objectives_type ON timeline_objectives (type, subtype)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_wards_match ON timeline_wards (match_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_wards_type ON timeline_wards (type)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_wards_map ON timeline_wards (x, y)",
];

/// Create every corpus table (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    for (name, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        debug!(table = name, "Table ready");
    }
    Ok(())
}

/// Create warehouse indexes (idempotent)
pub async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    debug!(count = INDEXES.len(), "Indexes ready");
    Ok(())
}
