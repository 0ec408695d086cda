use std::io;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::data::export::{write_standings_csv, write_team_standings_csv};
use crate::data::import::{import_results_file, import_teams_file, ImportReport};
use crate::data::validate::{validate_results, ValidationSeverity};
use crate::data::{ResultStore, UpsertOutcome};
use crate::parallel::{place_tournaments, TournamentBatch, WorkerPool};
use crate::placement::{place_results, rank_teams, Standings, StandingsReport};
use crate::server;

const USAGE: &str =
    "usage: weighin <serve|place|teams|import|standings|recalculate|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Place,
    Teams,
    Import,
    Standings,
    Recalculate,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("place") => Some(Command::Place),
        Some("teams") => Some(Command::Teams),
        Some("import") => Some(Command::Import),
        Some("standings") => Some(Command::Standings),
        Some("recalculate") => Some(Command::Recalculate),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String], config: &AppConfig) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(config),
        Some(Command::Place) => handle_place(args),
        Some(Command::Teams) => handle_teams(args),
        Some(Command::Import) => handle_import(args, config),
        Some(Command::Standings) => handle_standings(args, config),
        Some(Command::Recalculate) => handle_recalculate(config),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_serve(config: &AppConfig) -> i32 {
    let Some(store) = open_store(config) else {
        return 1;
    };
    match server::run_server(&config.server.bind_addr, store) {
        Ok(()) => 0,
        Err(err) => {
            error!(%err, "server error");
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_place(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: weighin place <results.csv> [--csv]");
        return 2;
    };
    let Some(report) = read_sheet(import_results_file(path), path) else {
        return 1;
    };

    let ranked = place_results(&report.records);
    if wants_csv(args) {
        emit_csv(write_standings_csv(io::stdout().lock(), &ranked))
    } else {
        emit_json(&ranked)
    }
}

fn handle_teams(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: weighin teams <teams.csv> [--csv]");
        return 2;
    };
    let Some(report) = read_sheet(import_teams_file(path), path) else {
        return 1;
    };

    let ranked = rank_teams(&report.records);
    if wants_csv(args) {
        emit_csv(write_team_standings_csv(io::stdout().lock(), &ranked))
    } else {
        emit_json(&ranked)
    }
}

fn handle_import(args: &[String], config: &AppConfig) -> i32 {
    let (Some(tournament_id), Some(path)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: weighin import <tournament_id> <results.csv>");
        return 2;
    };
    let Some(tournament_id) = parse_tournament_id(tournament_id) else {
        return 2;
    };
    let Some(report) = read_sheet(import_results_file(path), path) else {
        return 1;
    };

    let validation = validate_results(&report.records);
    for diag in &validation.diagnostics {
        eprintln!("- {diag}");
    }
    if validation.has_errors() {
        eprintln!(
            "import aborted: {} validation error(s)",
            validation.count(ValidationSeverity::Error)
        );
        return 1;
    }

    let Some(mut store) = open_store(config) else {
        return 1;
    };
    let committed = store.commit(|store| {
        let mut inserted = 0usize;
        let mut updated = 0usize;
        for result in report.records {
            match store.upsert(tournament_id, result) {
                UpsertOutcome::Inserted => inserted += 1,
                UpsertOutcome::Updated => updated += 1,
            }
        }
        (inserted, updated)
    });
    let (inserted, updated) = match committed {
        Ok(counts) => counts,
        Err(err) => {
            eprintln!("import failed: {err}");
            return 1;
        }
    };

    info!(tournament_id, inserted, updated, "imported results");
    println!(
        "import complete: tournament={tournament_id}, inserted={inserted}, updated={updated}, rejected={}",
        report.rejected.len()
    );
    0
}

fn handle_standings(args: &[String], config: &AppConfig) -> i32 {
    let Some(tournament_id) = args.get(2) else {
        eprintln!("usage: weighin standings <tournament_id> [--csv]");
        return 2;
    };
    let Some(tournament_id) = parse_tournament_id(tournament_id) else {
        return 2;
    };
    let Some(store) = open_store(config) else {
        return 1;
    };

    let results = store.results(tournament_id);
    if results.is_empty() {
        eprintln!("tournament {tournament_id} has no results");
        return 1;
    }

    let standings = Standings::build(tournament_id, &results);
    if wants_csv(args) {
        emit_csv(write_standings_csv(io::stdout().lock(), &standings.results))
    } else {
        emit_json(&StandingsReport::from(&standings))
    }
}

fn handle_recalculate(config: &AppConfig) -> i32 {
    let Some(mut store) = open_store(config) else {
        return 1;
    };

    let batches: Vec<TournamentBatch> = store
        .tournament_ids()
        .into_iter()
        .map(|tournament_id| TournamentBatch {
            tournament_id,
            results: store.results(tournament_id),
        })
        .collect();

    let placed = place_tournaments(&batches, &WorkerPool::with_workers(config.workers));
    let committed = store.commit(|store| {
        placed
            .iter()
            .map(|tournament| store.record_placements(tournament.tournament_id, &tournament.ranked))
            .sum::<usize>()
    });
    let entries = match committed {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("recalculate failed: {err}");
            return 1;
        }
    };

    println!(
        "recalculated: tournaments={}, placed_entries={entries}",
        placed.len()
    );
    0
}

fn handle_validate(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: weighin validate <results.csv>");
        return 2;
    };
    let Some(report) = read_sheet(import_results_file(path), path) else {
        return 1;
    };

    let validation = validate_results(&report.records);
    for diag in &validation.diagnostics {
        eprintln!("- {diag}");
    }
    if validation.has_errors() || report.has_rejections() {
        eprintln!(
            "validation failed: {} issue(s)",
            validation.count(ValidationSeverity::Error) + report.rejected.len()
        );
        return 1;
    }

    println!(
        "validation passed: {path} ({} results, {} warning(s))",
        report.records.len(),
        validation.count(ValidationSeverity::Warning)
    );
    0
}

fn read_sheet<T>(
    imported: Result<ImportReport<T>, crate::data::import::ImportError>,
    path: &str,
) -> Option<ImportReport<T>> {
    match imported {
        Ok(report) => {
            for rejected in &report.rejected {
                eprintln!("- line {}: {}", rejected.line, rejected.reason);
            }
            Some(report)
        }
        Err(err) => {
            eprintln!("failed to load '{path}': {err}");
            None
        }
    }
}

fn open_store(config: &AppConfig) -> Option<ResultStore> {
    match ResultStore::open(&config.store.path) {
        Ok(store) => Some(store),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    }
}

fn parse_tournament_id(raw: &str) -> Option<i64> {
    match raw.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            eprintln!("invalid tournament id '{raw}'");
            None
        }
    }
}

fn wants_csv(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "--csv")
}

fn emit_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

fn emit_csv(written: Result<(), csv::Error>) -> i32 {
    match written {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("failed to write CSV: {err}");
            1
        }
    }
}
