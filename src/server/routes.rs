use std::sync::PoisonError;

use tracing::error;

use crate::server::api::{self, ApiError};
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

pub fn route_request(state: &AppState, method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);

    if let Some(rest) = path.strip_prefix("/api/tournaments/") {
        return route_tournament(state, method, rest, body);
    }

    match (method, path) {
        ("GET", "/api/health") => respond(api::health_payload()),
        ("POST", "/api/placement") => respond(api::placement_payload(body)),
        ("POST", "/api/teams/placement") => respond(api::team_placement_payload(body)),
        ("POST", "/api/teams/placement.csv") => {
            respond_csv(api::team_placement_csv_payload(body))
        }
        ("GET", "/api/tournaments") => {
            let store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
            respond(api::tournaments_payload(&store))
        }
        _ => error_response(404, "Route not found"),
    }
}

fn route_tournament(state: &AppState, method: &str, rest: &str, body: &str) -> HttpResponse {
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    let Some(Ok(tournament_id)) = segments.first().map(|id| id.parse::<i64>()) else {
        return error_response(400, "Invalid tournament id");
    };

    let mut store = state.store.lock().unwrap_or_else(PoisonError::into_inner);
    match (method, &segments[1..]) {
        ("GET", ["results"]) => respond(api::results_payload(&store, tournament_id)),
        ("PUT", ["results"]) => respond(api::upsert_result_payload(&mut store, tournament_id, body)),
        ("DELETE", ["results", angler_id]) => match angler_id.parse::<i64>() {
            Ok(angler_id) => {
                respond(api::delete_result_payload(&mut store, tournament_id, angler_id))
            }
            Err(_) => error_response(400, "Invalid angler id"),
        },
        ("GET", ["standings"]) => respond(api::standings_payload(&store, tournament_id)),
        ("GET", ["standings.csv"]) => respond_csv(api::standings_csv_payload(&store, tournament_id)),
        ("POST", ["teams"]) => respond(api::team_standings_payload(&store, tournament_id, body)),
        ("POST", ["recalculate"]) => respond(api::recalculate_payload(&mut store, tournament_id)),
        _ => error_response(404, "Route not found"),
    }
}

fn respond(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse {
            status_code: 200,
            content_type: "application/json",
            body: payload,
        },
        Err(err) => api_error_response(err),
    }
}

fn respond_csv(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse {
            status_code: 200,
            content_type: "text/csv; charset=utf-8",
            body: payload,
        },
        Err(err) => api_error_response(err),
    }
}

fn api_error_response(err: ApiError) -> HttpResponse {
    match err {
        ApiError::Parse(err) => error_response(400, &format!("Invalid request body: {err}")),
        ApiError::Validation(payload) => validation_error_response(payload),
        ApiError::NotFound(message) => error_response(404, &message),
        err => {
            error!(%err, "request failed");
            error_response(500, &err.to_string())
        }
    }
}

fn validation_error_response(payload: api::ValidationErrorResponse) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code: 400,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

pub fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
