//! JSON-file results store keyed by (tournament_id, angler_id).
//!
//! Entries keep their insertion order: it is the only tie-break the placement engine has,
//! so an update rewrites the entry where it already sits.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::placement::{AnglerId, RankedResult, RawResult, TournamentId};

pub const DEFAULT_STORE_PATH: &str = "data/results.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read results store '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse results store '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write results store '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize results store: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    #[serde(flatten)]
    pub result: RawResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_place: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_points: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentSummary {
    pub tournament_id: TournamentId,
    pub entries: usize,
    pub placed: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    #[serde(default)]
    tournaments: BTreeMap<TournamentId, Vec<StoredResult>>,
}

#[derive(Debug, Default)]
pub struct ResultStore {
    path: Option<PathBuf>,
    tournaments: BTreeMap<TournamentId, Vec<StoredResult>>,
}

impl ResultStore {
    /// A store with no backing file; `save` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "results store missing, starting empty");
            return Ok(Self {
                path: Some(path),
                tournaments: BTreeMap::new(),
            });
        }

        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let file: StoreFile = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        info!(
            path = %path.display(),
            tournaments = file.tournaments.len(),
            "loaded results store"
        );
        Ok(Self {
            path: Some(path),
            tournaments: file.tournaments,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert or replace the angler's result. Any stored placement for the tournament is
    /// stale after this and is cleared.
    pub fn upsert(&mut self, tournament_id: TournamentId, result: RawResult) -> UpsertOutcome {
        let entries = self.tournaments.entry(tournament_id).or_default();
        clear_placements(entries);

        match entries
            .iter_mut()
            .find(|entry| entry.result.angler_id == result.angler_id)
        {
            Some(existing) => {
                existing.result = result;
                UpsertOutcome::Updated
            }
            None => {
                entries.push(StoredResult {
                    result,
                    calculated_place: None,
                    calculated_points: None,
                });
                UpsertOutcome::Inserted
            }
        }
    }

    pub fn remove(&mut self, tournament_id: TournamentId, angler_id: AnglerId) -> bool {
        let Some(entries) = self.tournaments.get_mut(&tournament_id) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.result.angler_id != angler_id);
        let removed = entries.len() != before;
        if removed {
            clear_placements(entries);
        }
        if entries.is_empty() {
            self.tournaments.remove(&tournament_id);
        }
        removed
    }

    /// Raw results for one tournament in insertion order; empty for an unknown tournament.
    pub fn results(&self, tournament_id: TournamentId) -> Vec<RawResult> {
        self.tournaments
            .get(&tournament_id)
            .map(|entries| entries.iter().map(|entry| entry.result.clone()).collect())
            .unwrap_or_default()
    }

    pub fn stored(&self, tournament_id: TournamentId) -> &[StoredResult] {
        self.tournaments
            .get(&tournament_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn placement(
        &self,
        tournament_id: TournamentId,
        angler_id: AnglerId,
    ) -> Option<(u32, i32)> {
        self.stored(tournament_id)
            .iter()
            .find(|entry| entry.result.angler_id == angler_id)
            .and_then(|entry| entry.calculated_place.zip(entry.calculated_points))
    }

    pub fn tournament_ids(&self) -> Vec<TournamentId> {
        self.tournaments.keys().copied().collect()
    }

    pub fn tournaments(&self) -> Vec<TournamentSummary> {
        self.tournaments
            .iter()
            .map(|(tournament_id, entries)| TournamentSummary {
                tournament_id: *tournament_id,
                entries: entries.len(),
                placed: entries.iter().any(|entry| entry.calculated_place.is_some()),
            })
            .collect()
    }

    /// Write computed place/points back onto stored entries. Entries absent from `ranked`
    /// (disqualified ones) end up with no placement. Returns how many entries were placed.
    pub fn record_placements(
        &mut self,
        tournament_id: TournamentId,
        ranked: &[RankedResult],
    ) -> usize {
        let Some(entries) = self.tournaments.get_mut(&tournament_id) else {
            return 0;
        };
        clear_placements(entries);

        let mut placed = 0;
        for ranked_result in ranked {
            if let Some(entry) = entries
                .iter_mut()
                .find(|entry| entry.result.angler_id == ranked_result.angler_id())
            {
                entry.calculated_place = Some(ranked_result.calculated_place);
                entry.calculated_points = Some(ranked_result.calculated_points);
                placed += 1;
            }
        }
        placed
    }

    /// Persist to the backing file via a temp file and rename.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };

        let file = StoreFile {
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
            tournaments: self.tournaments.clone(),
        };
        let serialized = serde_json::to_string_pretty(&file)?;

        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized).map_err(write_err)?;
        fs::rename(&tmp_path, path).map_err(write_err)?;

        debug!(path = %path.display(), "saved results store");
        Ok(())
    }

    /// Apply `change` and persist it. When the save fails the in-memory tournaments are
    /// restored, so readers never see data that is not on disk.
    pub fn commit<R>(&mut self, change: impl FnOnce(&mut Self) -> R) -> Result<R, StoreError> {
        let snapshot = self.tournaments.clone();
        let outcome = change(self);
        if let Err(err) = self.save() {
            warn!(%err, "save failed, rolling back results store");
            self.tournaments = snapshot;
            return Err(err);
        }
        Ok(outcome)
    }
}

fn clear_placements(entries: &mut [StoredResult]) {
    for entry in entries {
        entry.calculated_place = None;
        entry.calculated_points = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::place_results;
    use rust_decimal_macros::dec;

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = ResultStore::in_memory();
        assert_eq!(store.upsert(1, RawResult::new(10, dec!(5))), UpsertOutcome::Inserted);
        assert_eq!(store.upsert(1, RawResult::new(11, dec!(5))), UpsertOutcome::Inserted);
        assert_eq!(store.upsert(1, RawResult::new(10, dec!(7))), UpsertOutcome::Updated);

        let results = store.results(1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].angler_id, 10);
        assert_eq!(results[0].total_weight, dec!(7));
    }

    #[test]
    fn same_angler_in_two_tournaments_is_two_entries() {
        let mut store = ResultStore::in_memory();
        store.upsert(1, RawResult::new(10, dec!(5)));
        store.upsert(2, RawResult::new(10, dec!(3)));
        assert_eq!(store.tournament_ids(), vec![1, 2]);
        assert_eq!(store.results(2)[0].total_weight, dec!(3));
    }

    #[test]
    fn placements_are_written_back_and_cleared_on_change() {
        let mut store = ResultStore::in_memory();
        store.upsert(3, RawResult::new(1, dec!(9)));
        store.upsert(3, RawResult::new(2, dec!(4)).as_disqualified());

        let ranked = place_results(&store.results(3));
        assert_eq!(store.record_placements(3, &ranked), 1);
        assert_eq!(store.placement(3, 1), Some((1, 100)));
        assert_eq!(store.placement(3, 2), None);
        assert!(store.tournaments()[0].placed);

        store.upsert(3, RawResult::new(4, dec!(2)));
        assert_eq!(store.placement(3, 1), None);
    }

    #[test]
    fn removing_last_entry_drops_tournament() {
        let mut store = ResultStore::in_memory();
        store.upsert(5, RawResult::new(1, dec!(1)));
        assert!(!store.remove(5, 99));
        assert!(store.remove(5, 1));
        assert!(store.tournament_ids().is_empty());
        assert!(!store.remove(6, 1));
    }

    #[test]
    fn failed_commit_restores_previous_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").expect("blocker file");
        let mut store = ResultStore::open(blocker.join("results.json")).expect("store opens");

        store.upsert(1, RawResult::new(10, dec!(5)));
        let ranked = place_results(&store.results(1));
        store.record_placements(1, &ranked);

        let failed = store.commit(|store| store.upsert(1, RawResult::new(11, dec!(8))));
        assert!(matches!(failed, Err(StoreError::Write { .. })));
        assert_eq!(store.results(1).len(), 1);
        assert_eq!(store.placement(1, 10), Some((1, 100)));
    }

    #[test]
    fn in_memory_save_is_a_no_op() {
        let store = ResultStore::in_memory();
        assert!(store.save().is_ok());
        assert!(store.path().is_none());
    }
}
