use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::data::export::{standings_csv_string, team_standings_csv_string};
use crate::data::validate::{validate_result, ValidationReport, ValidationSeverity};
use crate::data::{ResultStore, StoreError, UpsertOutcome};
use crate::placement::{
    assemble_teams, place_results, rank_teams, AnglerId, RawResult, Standings, StandingsReport,
    TeamPairing, TeamResult, TournamentId,
};

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid request")]
    Validation(ValidationErrorResponse),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to render CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertResponse {
    pub status: &'static str,
    pub tournament_id: TournamentId,
    pub angler_id: AnglerId,
    pub outcome: UpsertOutcome,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecalculateResponse {
    pub status: &'static str,
    pub tournament_id: TournamentId,
    pub placed: usize,
    pub disqualified: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResultsBody {
    List(Vec<RawResult>),
    Wrapped { results: Vec<RawResult> },
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Serialize)
}

pub fn health_payload() -> Result<String, ApiError> {
    to_json(&serde_json::json!({
        "status": "ok",
        "service": "weighin-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Stateless placement: rank whatever results are posted, exactly as the engine does.
pub fn placement_payload(body: &str) -> Result<String, ApiError> {
    let body: ResultsBody = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let results = match body {
        ResultsBody::List(results) | ResultsBody::Wrapped { results } => results,
    };
    to_json(&place_results(&results))
}

pub fn team_placement_payload(body: &str) -> Result<String, ApiError> {
    let teams: Vec<TeamResult> = serde_json::from_str(body).map_err(ApiError::Parse)?;
    to_json(&rank_teams(&teams))
}

pub fn team_placement_csv_payload(body: &str) -> Result<String, ApiError> {
    let teams: Vec<TeamResult> = serde_json::from_str(body).map_err(ApiError::Parse)?;
    Ok(team_standings_csv_string(&rank_teams(&teams))?)
}

pub fn tournaments_payload(store: &ResultStore) -> Result<String, ApiError> {
    to_json(&serde_json::json!({ "tournaments": store.tournaments() }))
}

pub fn results_payload(store: &ResultStore, tournament_id: TournamentId) -> Result<String, ApiError> {
    to_json(&serde_json::json!({
        "tournament_id": tournament_id,
        "results": store.stored(tournament_id),
    }))
}

pub fn upsert_result_payload(
    store: &mut ResultStore,
    tournament_id: TournamentId,
    body: &str,
) -> Result<String, ApiError> {
    let result: RawResult = serde_json::from_str(body).map_err(ApiError::Parse)?;

    let mut report = ValidationReport::default();
    validate_result(&result, &mut report);
    if report.has_errors() {
        return Err(ApiError::Validation(validation_error_response(&report)));
    }

    let angler_id = result.angler_id;
    let outcome = store.commit(|store| store.upsert(tournament_id, result))?;
    info!(tournament_id, angler_id, ?outcome, "recorded result");

    to_json(&UpsertResponse {
        status: "ok",
        tournament_id,
        angler_id,
        outcome,
        warnings: report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity != ValidationSeverity::Error)
            .map(|diag| diag.to_string())
            .collect(),
    })
}

pub fn delete_result_payload(
    store: &mut ResultStore,
    tournament_id: TournamentId,
    angler_id: AnglerId,
) -> Result<String, ApiError> {
    let present = store
        .stored(tournament_id)
        .iter()
        .any(|entry| entry.result.angler_id == angler_id);
    if !present {
        return Err(ApiError::NotFound(format!(
            "No result for angler {angler_id} in tournament {tournament_id}"
        )));
    }
    store.commit(|store| store.remove(tournament_id, angler_id))?;
    info!(tournament_id, angler_id, "removed result");
    to_json(&serde_json::json!({ "status": "ok" }))
}

fn tournament_results(store: &ResultStore, tournament_id: TournamentId) -> Result<Vec<RawResult>, ApiError> {
    let results = store.results(tournament_id);
    if results.is_empty() {
        return Err(ApiError::NotFound(format!(
            "Tournament {tournament_id} has no results"
        )));
    }
    Ok(results)
}

pub fn standings_payload(store: &ResultStore, tournament_id: TournamentId) -> Result<String, ApiError> {
    let results = tournament_results(store, tournament_id)?;
    let standings = Standings::build(tournament_id, &results);
    to_json(&StandingsReport::from(&standings))
}

pub fn standings_csv_payload(
    store: &ResultStore,
    tournament_id: TournamentId,
) -> Result<String, ApiError> {
    let results = tournament_results(store, tournament_id)?;
    Ok(standings_csv_string(&place_results(&results))?)
}

/// Team standings for a stored tournament, built from the posted pairings and the
/// members' individual weigh-ins.
pub fn team_standings_payload(
    store: &ResultStore,
    tournament_id: TournamentId,
    body: &str,
) -> Result<String, ApiError> {
    let pairings: Vec<TeamPairing> = serde_json::from_str(body).map_err(ApiError::Parse)?;
    let results = tournament_results(store, tournament_id)?;
    to_json(&serde_json::json!({
        "tournament_id": tournament_id,
        "teams": rank_teams(&assemble_teams(&pairings, &results)),
    }))
}

/// Compute standings and write place/points back to the store.
pub fn recalculate_payload(
    store: &mut ResultStore,
    tournament_id: TournamentId,
) -> Result<String, ApiError> {
    let results = tournament_results(store, tournament_id)?;
    let ranked = place_results(&results);
    let placed = store.commit(|store| store.record_placements(tournament_id, &ranked))?;
    info!(tournament_id, placed, "recalculated standings");

    to_json(&RecalculateResponse {
        status: "ok",
        tournament_id,
        placed,
        disqualified: results.iter().filter(|r| r.disqualified).count(),
    })
}

fn validation_error_response(report: &ValidationReport) -> ValidationErrorResponse {
    let mut by_field: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for diag in report.errors() {
        by_field
            .entry(diag.field)
            .or_default()
            .push(diag.message.clone());
    }
    ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        errors: by_field
            .into_iter()
            .map(|(field, messages)| ValidationIssue { field, messages })
            .collect(),
    }
}
