//! Weigh-in sheet import from CSV.
//!
//! Results columns: `angler_id,angler_name,total_weight,num_fish,big_bass_weight,
//! dead_fish_penalty,buy_in,disqualified`. Only `angler_id` and `total_weight` are required.
//! Team columns: `team_id,angler1_id,angler2_id,total_weight,num_fish,big_bass_weight`.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::placement::{RawResult, TeamResult};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse import CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based line in the source, header included.
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

impl<T> ImportReport<T> {
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    angler_id: String,
    #[serde(default)]
    angler_name: Option<String>,
    total_weight: String,
    #[serde(default)]
    num_fish: Option<String>,
    #[serde(default)]
    big_bass_weight: Option<String>,
    #[serde(default)]
    dead_fish_penalty: Option<String>,
    #[serde(default)]
    buy_in: Option<String>,
    #[serde(default)]
    disqualified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    team_id: String,
    angler1_id: String,
    #[serde(default)]
    angler2_id: Option<String>,
    total_weight: String,
    #[serde(default)]
    num_fish: Option<String>,
    #[serde(default)]
    big_bass_weight: Option<String>,
}

pub fn import_results_csv(reader: impl Read) -> Result<ImportReport<RawResult>, ImportError> {
    import_rows(reader, parse_result_row)
}

pub fn import_results_file(path: impl AsRef<Path>) -> Result<ImportReport<RawResult>, ImportError> {
    let path = path.as_ref();
    let report = import_results_csv(File::open(path)?)?;
    info!(
        path = %path.display(),
        accepted = report.records.len(),
        rejected = report.rejected.len(),
        "imported results sheet"
    );
    Ok(report)
}

pub fn import_teams_csv(reader: impl Read) -> Result<ImportReport<TeamResult>, ImportError> {
    import_rows(reader, parse_team_row)
}

pub fn import_teams_file(path: impl AsRef<Path>) -> Result<ImportReport<TeamResult>, ImportError> {
    import_teams_csv(File::open(path.as_ref())?)
}

fn import_rows<R, T, F>(reader: impl Read, parse: F) -> Result<ImportReport<T>, ImportError>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<T, String>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut report = ImportReport {
        records: Vec::new(),
        rejected: Vec::new(),
    };

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let parsed = record
            .deserialize::<R>(Some(&headers))
            .map_err(|err| err.to_string())
            .and_then(&parse);
        match parsed {
            Ok(parsed) => report.records.push(parsed),
            Err(reason) => {
                warn!(line, %reason, "rejected import row");
                report.rejected.push(RejectedRow { line, reason });
            }
        }
    }

    Ok(report)
}

fn parse_result_row(row: ResultRow) -> Result<RawResult, String> {
    Ok(RawResult {
        angler_id: parse_id("angler_id", &row.angler_id)?,
        angler_name: row.angler_name.filter(|name| !name.is_empty()),
        total_weight: parse_decimal("total_weight", &row.total_weight)?,
        num_fish: parse_count("num_fish", row.num_fish.as_deref())?,
        big_bass_weight: parse_optional_decimal("big_bass_weight", row.big_bass_weight.as_deref())?,
        dead_fish_penalty: parse_optional_decimal(
            "dead_fish_penalty",
            row.dead_fish_penalty.as_deref(),
        )?,
        buy_in: parse_flag("buy_in", row.buy_in.as_deref())?,
        disqualified: parse_flag("disqualified", row.disqualified.as_deref())?,
    })
}

fn parse_team_row(row: TeamRow) -> Result<TeamResult, String> {
    let angler2_id = match row.angler2_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_id("angler2_id", raw)?),
    };
    Ok(TeamResult {
        team_id: parse_id("team_id", &row.team_id)?,
        angler1_id: parse_id("angler1_id", &row.angler1_id)?,
        angler2_id,
        total_weight: parse_decimal("total_weight", &row.total_weight)?,
        num_fish: parse_count("num_fish", row.num_fish.as_deref())?,
        big_bass_weight: parse_optional_decimal("big_bass_weight", row.big_bass_weight.as_deref())?,
    })
}

fn parse_id(field: &str, raw: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("{field}: '{raw}' is not an integer id"))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("{field}: '{raw}' is not a decimal number"))
}

fn parse_optional_decimal(field: &str, raw: Option<&str>) -> Result<Decimal, String> {
    match raw {
        None | Some("") => Ok(Decimal::ZERO),
        Some(raw) => parse_decimal(field, raw),
    }
}

fn parse_count(field: &str, raw: Option<&str>) -> Result<u32, String> {
    match raw {
        None | Some("") => Ok(0),
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("{field}: '{raw}' is not a non-negative count")),
    }
}

fn parse_flag(field: &str, raw: Option<&str>) -> Result<bool, String> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Ok(false),
        "true" | "1" | "yes" | "y" => Ok(true),
        _ => Err(format!("{field}: '{raw}' is not a yes/no value")),
    }
}
