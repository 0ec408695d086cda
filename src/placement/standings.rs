use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::placement::engine::place_results;
use crate::placement::record::{AnglerId, Category, RankedResult, RawResult, TournamentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigBass {
    pub angler_id: AnglerId,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentStats {
    pub anglers: usize,
    pub placed: usize,
    pub disqualified: usize,
    pub buy_ins: usize,
    pub zeros: usize,
    pub total_fish: u32,
    pub total_weight: Decimal,
    pub total_penalty: Decimal,
    pub net_weight: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_bass: Option<BigBass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heaviest_bag: Option<BigBass>,
}

impl TournamentStats {
    /// Totals cover anglers who weighed in: disqualified entries and buy-ins are counted
    /// but add no fish or weight.
    pub fn from_results(results: &[RawResult]) -> Self {
        let mut stats = Self {
            anglers: results.len(),
            ..Self::default()
        };
        let mut fish_weight = Decimal::ZERO;
        let mut fish_anglers = 0u32;

        for result in results {
            match result.category() {
                Some(Category::Disqualified) => {
                    stats.disqualified += 1;
                    continue;
                }
                Some(Category::BuyIn) => {
                    stats.buy_ins += 1;
                    stats.placed += 1;
                    continue;
                }
                Some(Category::Zero) => {
                    stats.zeros += 1;
                    stats.placed += 1;
                }
                Some(Category::Fish) => {
                    stats.placed += 1;
                    fish_anglers += 1;
                    fish_weight += result.total_weight;
                    if stats
                        .heaviest_bag
                        .as_ref()
                        .map_or(true, |best| result.total_weight > best.weight)
                    {
                        stats.heaviest_bag = Some(BigBass {
                            angler_id: result.angler_id,
                            weight: result.total_weight,
                        });
                    }
                }
                None => continue,
            }

            stats.total_fish = stats.total_fish.saturating_add(result.num_fish);
            stats.total_weight += result.total_weight;
            stats.total_penalty += result.dead_fish_penalty;
            stats.net_weight += result.net_weight();

            if result.big_bass_weight > Decimal::ZERO
                && stats
                    .big_bass
                    .as_ref()
                    .map_or(true, |best| result.big_bass_weight > best.weight)
            {
                stats.big_bass = Some(BigBass {
                    angler_id: result.angler_id,
                    weight: result.big_bass_weight,
                });
            }
        }

        if fish_anglers > 0 {
            stats.average_weight = Some(
                (fish_weight / Decimal::from(fish_anglers))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            );
        }

        stats
    }
}

/// Everything a results page needs for one tournament: placed anglers, the
/// disqualified entries that were left unplaced, and summary figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub tournament_id: TournamentId,
    pub results: Vec<RankedResult>,
    pub disqualified: Vec<RawResult>,
    pub stats: TournamentStats,
}

impl Standings {
    pub fn build(tournament_id: TournamentId, results: &[RawResult]) -> Self {
        Self {
            tournament_id,
            results: place_results(results),
            disqualified: results.iter().filter(|r| r.disqualified).cloned().collect(),
            stats: TournamentStats::from_results(results),
        }
    }

    pub fn winner(&self) -> Option<&RankedResult> {
        self.results
            .first()
            .filter(|first| first.result.category() == Some(Category::Fish))
    }
}

/// Serialized view of [Standings] with the winner called out.
#[derive(Debug, Serialize)]
pub struct StandingsReport<'a> {
    #[serde(flatten)]
    pub standings: &'a Standings,
    pub winner: Option<&'a RankedResult>,
}

impl<'a> From<&'a Standings> for StandingsReport<'a> {
    fn from(standings: &'a Standings) -> Self {
        Self {
            standings,
            winner: standings.winner(),
        }
    }
}
