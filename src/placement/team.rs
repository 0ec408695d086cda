//! Team standings: combined weight ranking, no points.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::placement::record::{AnglerId, RawResult};

pub type TeamId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResult {
    pub team_id: TeamId,
    pub angler1_id: AnglerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angler2_id: Option<AnglerId>,
    pub total_weight: Decimal,
    #[serde(default)]
    pub num_fish: u32,
    #[serde(default)]
    pub big_bass_weight: Decimal,
}

impl TeamResult {
    /// A team fished by one angler with no partner. Only affects how the team is shown.
    pub fn is_solo(&self) -> bool {
        self.angler2_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTeamResult {
    #[serde(flatten)]
    pub team: TeamResult,
    pub calculated_place: u32,
}

/// Rank teams by combined weight, heaviest first. Equal weights keep input order and
/// still take consecutive places.
pub fn rank_teams(teams: &[TeamResult]) -> Vec<RankedTeamResult> {
    let mut ordered: Vec<&TeamResult> = teams.iter().collect();
    ordered.sort_by(|left, right| right.total_weight.cmp(&left.total_weight));

    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(team, place)| RankedTeamResult {
            team: team.clone(),
            calculated_place: place,
        })
        .collect()
}

/// Which anglers fished together as a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPairing {
    pub team_id: TeamId,
    pub angler1_id: AnglerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angler2_id: Option<AnglerId>,
}

/// Build team results from individual weigh-ins. Disqualified members and members
/// without a result contribute nothing.
pub fn assemble_teams(pairings: &[TeamPairing], results: &[RawResult]) -> Vec<TeamResult> {
    let member = |angler_id: AnglerId| {
        results
            .iter()
            .find(|result| result.angler_id == angler_id && !result.disqualified)
    };

    pairings
        .iter()
        .map(|pairing| {
            let members: Vec<&RawResult> = std::iter::once(pairing.angler1_id)
                .chain(pairing.angler2_id)
                .filter_map(&member)
                .collect();

            TeamResult {
                team_id: pairing.team_id,
                angler1_id: pairing.angler1_id,
                angler2_id: pairing.angler2_id,
                total_weight: members.iter().map(|m| m.total_weight).sum(),
                num_fish: members
                    .iter()
                    .fold(0u32, |total, m| total.saturating_add(m.num_fish)),
                big_bass_weight: members
                    .iter()
                    .map(|m| m.big_bass_weight)
                    .max()
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}
