pub mod batch;
pub mod pool;

pub use batch::{place_tournaments, PlacedTournament, TournamentBatch};
pub use pool::WorkerPool;
