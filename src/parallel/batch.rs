//! Recalculate many tournaments at once.
//!
//! Placement reads only its own tournament's entries, so each tournament is an
//! independent Rayon task; output keeps the input order.

use rayon::prelude::*;
use tracing::info;

use crate::parallel::pool::WorkerPool;
use crate::placement::{place_results, RankedResult, RawResult, TournamentId};

#[derive(Debug, Clone)]
pub struct TournamentBatch {
    pub tournament_id: TournamentId,
    pub results: Vec<RawResult>,
}

#[derive(Debug, Clone)]
pub struct PlacedTournament {
    pub tournament_id: TournamentId,
    pub ranked: Vec<RankedResult>,
}

pub fn place_tournaments(batches: &[TournamentBatch], pool: &WorkerPool) -> Vec<PlacedTournament> {
    let placed: Vec<PlacedTournament> = pool.install(|| {
        batches
            .par_iter()
            .map(|batch| PlacedTournament {
                tournament_id: batch.tournament_id,
                ranked: place_results(&batch.results),
            })
            .collect()
    });
    info!(
        tournaments = placed.len(),
        workers = pool.workers,
        "placed tournament batch"
    );
    placed
}
