//! Match detail to per-participant records
//!
//! Pure functions: no I/O, no clock, no shared state.

use crate::client::dto::{MatchDto, ParticipantDto, PerksDto, TeamDto};
use crate::error::NormalizeError;
use tierforge_common::models::{
    MatchRecord, Outcome, PerformanceMetrics, PerkSummary, Role, Side, TeamObjectives, BAN_SLOTS,
    NONE_ID,
};

/// Turn one match detail into one record per participant
///
/// Records come out in participant order with 1-based participant ids.
/// Team objectives and the match-wide ban list are copied onto every row.
pub fn normalize_match(detail: &MatchDto) -> Result<Vec<MatchRecord>, NormalizeError> {
    let match_id = detail.metadata.match_id.as_str();
    let info = &detail.info;

    if match_id.is_empty() {
        return Err(NormalizeError::MissingMatchId);
    }
    if info.game_version.trim().is_empty() {
        return Err(NormalizeError::MissingVersion(match_id.to_string()));
    }
    if info.participants.is_empty() {
        return Err(NormalizeError::NoParticipants(match_id.to_string()));
    }

    let bans = ban_slots(&info.teams);

    info.participants
        .iter()
        .enumerate()
        .map(|(slot, participant)| -> Result<MatchRecord, NormalizeError> {
            let side = Side::from_team_id(participant.team_id).ok_or_else(|| {
                NormalizeError::UnknownTeam {
                    match_id: match_id.to_string(),
                    slot,
                    team_id: participant.team_id,
                }
            })?;

            Ok(MatchRecord {
                match_id: match_id.to_string(),
                participant_id: slot as u32 + 1,
                entity_id: participant.puuid.clone(),
                version: info.game_version.clone(),
                duration_seconds: info.game_duration,
                side,
                outcome: if participant.win {
                    Outcome::Win
                } else {
                    Outcome::Loss
                },
                role: Role::from_position(&participant.team_position),
                lane: participant.lane.clone(),
                champion_id: participant.champion_id,
                champion: participant.champion_name.clone(),
                metrics: metrics(participant),
                items: [
                    participant.item0,
                    participant.item1,
                    participant.item2,
                    participant.item3,
                    participant.item4,
                    participant.item5,
                    participant.item6,
                ],
                perks: perk_summary(participant.perks.as_ref()),
                spells: [participant.summoner1_id, participant.summoner2_id],
                team_objectives: team_objectives(&info.teams, participant.team_id),
                bans,
            })
        })
        .collect()
}

fn metrics(p: &ParticipantDto) -> PerformanceMetrics {
    let (kda, solo_kills) = p
        .challenges
        .as_ref()
        .map(|c| (c.kda, c.solo_kills))
        .unwrap_or((0.0, 0));

    PerformanceMetrics {
        kills: p.kills,
        deaths: p.deaths,
        assists: p.assists,
        kda,
        solo_kills,
        total_damage: p.total_damage_dealt_to_champions,
        damage_taken: p.total_damage_taken,
        cs_total: p.total_minions_killed + p.neutral_minions_killed,
        gold_earned: p.gold_earned,
        vision_score: p.vision_score,
        control_wards: p.vision_wards_bought_in_game,
    }
}

/// Bans of both teams in listing order, padded with `NONE_ID`
fn ban_slots(teams: &[TeamDto]) -> [i64; BAN_SLOTS] {
    let mut slots = [NONE_ID; BAN_SLOTS];
    let bans = teams.iter().flat_map(|team| team.bans.iter());
    for (slot, ban) in slots.iter_mut().zip(bans) {
        *slot = ban.champion_id;
    }
    slots
}

fn team_objectives(teams: &[TeamDto], team_id: i64) -> TeamObjectives {
    teams
        .iter()
        .find(|team| team.team_id == team_id)
        .map(|team| TeamObjectives {
            dragon: team.objectives.dragon.kills,
            baron: team.objectives.baron.kills,
            horde: team.objectives.horde.kills,
            first_blood: team.objectives.champion.first,
        })
        .unwrap_or_default()
}

/// Primary tree, keystone, secondary tree
///
/// An incomplete rune page yields `NONE_ID` in every slot.
fn perk_summary(perks: Option<&PerksDto>) -> PerkSummary {
    let summary = perks.and_then(|perks| {
        let primary = perks.styles.first()?;
        let secondary = perks.styles.get(1)?;
        let keystone = primary.selections.first()?;
        Some(PerkSummary {
            primary_style: primary.style,
            keystone: keystone.perk,
            secondary_style: secondary.style,
        })
    });
    summary.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::dto::{
        BanDto, ChallengesDto, MatchInfoDto, MatchMetadataDto, ObjectiveDto, ObjectivesDto,
        PerkSelectionDto, PerkStyleDto,
    };
    use tierforge_common::models::EMPTY_ITEM;

    fn participant(slot: usize) -> ParticipantDto {
        let blue = slot < 5;
        ParticipantDto {
            puuid: format!("puuid-{slot}"),
            participant_id: slot as u32 + 1,
            team_id: if blue { 100 } else { 200 },
            win: blue,
            champion_id: 10 + slot as i64,
            champion_name: format!("Champ{slot}"),
            team_position: ["TOP", "JUNGLE", "MIDDLE", "BOTTOM", "UTILITY"][slot % 5].to_string(),
            total_minions_killed: 150,
            neutral_minions_killed: 12,
            item0: 3153,
            challenges: Some(ChallengesDto {
                kda: 3.5,
                solo_kills: 2,
            }),
            ..Default::default()
        }
    }

    fn team(team_id: i64, bans: &[i64], dragons: u32) -> TeamDto {
        TeamDto {
            team_id,
            win: team_id == 100,
            bans: bans
                .iter()
                .enumerate()
                .map(|(i, id)| BanDto {
                    champion_id: *id,
                    pick_turn: i as i64 + 1,
                })
                .collect(),
            objectives: ObjectivesDto {
                dragon: ObjectiveDto {
                    first: team_id == 100,
                    kills: dragons,
                },
                champion: ObjectiveDto {
                    first: team_id == 200,
                    kills: 20,
                },
                ..Default::default()
            },
        }
    }

    fn detail() -> MatchDto {
        MatchDto {
            metadata: MatchMetadataDto {
                match_id: "KR_100".to_string(),
            },
            info: MatchInfoDto {
                game_version: "14.1.553.1234".to_string(),
                game_duration: 1820,
                queue_id: 420,
                participants: (0..10).map(participant).collect(),
                teams: vec![team(100, &[1, 2, 3], 3), team(200, &[4, 5, 6, 7], 1)],
            },
        }
    }

    #[test]
    fn test_one_record_per_participant() {
        let records = normalize_match(&detail()).unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].participant_id, 1);
        assert_eq!(records[9].participant_id, 10);
        assert_eq!(records[0].side, Side::Blue);
        assert_eq!(records[7].side, Side::Red);
        assert_eq!(records[4].role, Some(Role::Utility));
    }

    #[test]
    fn test_exactly_one_outcome_per_side() {
        let records = normalize_match(&detail()).unwrap();
        assert!(records
            .iter()
            .filter(|r| r.side == Side::Blue)
            .all(|r| r.outcome == Outcome::Win));
        assert!(records
            .iter()
            .filter(|r| r.side == Side::Red)
            .all(|r| r.outcome == Outcome::Loss));
    }

    #[test]
    fn test_bans_from_both_teams_padded() {
        let records = normalize_match(&detail()).unwrap();
        assert_eq!(records[0].bans, [1, 2, 3, 4, 5, 6, 7, NONE_ID, NONE_ID, NONE_ID]);
        assert!(records.iter().all(|r| r.bans == records[0].bans));
    }

    #[test]
    fn test_team_objectives_follow_side() {
        let records = normalize_match(&detail()).unwrap();
        assert_eq!(records[0].team_objectives.dragon, 3);
        assert!(!records[0].team_objectives.first_blood);
        assert_eq!(records[6].team_objectives.dragon, 1);
        assert!(records[6].team_objectives.first_blood);
    }

    #[test]
    fn test_metrics_and_slots() {
        let records = normalize_match(&detail()).unwrap();
        let first = &records[0];
        assert_eq!(first.metrics.cs_total, 162);
        assert_eq!(first.metrics.solo_kills, 2);
        assert_eq!(first.items[0], 3153);
        assert_eq!(first.items[6], EMPTY_ITEM);
        assert_eq!(first.perks, PerkSummary::default());
    }

    #[test]
    fn test_perk_summary() {
        let perks = PerksDto {
            styles: vec![
                PerkStyleDto {
                    style: 8000,
                    selections: vec![PerkSelectionDto { perk: 8010 }],
                },
                PerkStyleDto {
                    style: 8400,
                    selections: vec![],
                },
            ],
        };
        let summary = perk_summary(Some(&perks));
        assert_eq!(summary.primary_style, 8000);
        assert_eq!(summary.keystone, 8010);
        assert_eq!(summary.secondary_style, 8400);
    }

    #[test]
    fn test_rejects_unusable_detail() {
        let mut no_version = detail();
        no_version.info.game_version.clear();
        assert_eq!(
            normalize_match(&no_version),
            Err(NormalizeError::MissingVersion("KR_100".to_string()))
        );

        let mut empty = detail();
        empty.info.participants.clear();
        assert!(matches!(
            normalize_match(&empty),
            Err(NormalizeError::NoParticipants(_))
        ));

        let mut odd_team = detail();
        odd_team.info.participants[3].team_id = 300;
        assert!(matches!(
            normalize_match(&odd_team),
            Err(NormalizeError::UnknownTeam { slot: 3, .. })
        ));
    }
}
