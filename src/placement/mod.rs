pub mod engine;
pub mod record;
pub mod standings;
pub mod team;

pub use engine::{
    fish_points, partition, place_results, Partition, BUY_IN_FALLBACK_POINTS, BUY_IN_PENALTY,
    FALLBACK_PLACE, FIRST_PLACE_POINTS, ZERO_WEIGHT_FALLBACK_POINTS, ZERO_WEIGHT_PENALTY,
};
pub use record::{AnglerId, Category, RankedResult, RawResult, TournamentId};
pub use standings::{BigBass, Standings, StandingsReport, TournamentStats};
pub use team::{assemble_teams, rank_teams, RankedTeamResult, TeamId, TeamPairing, TeamResult};
