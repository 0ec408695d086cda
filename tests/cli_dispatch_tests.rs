use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

const RESULTS_CSV: &str = "\
angler_id,angler_name,total_weight,num_fish,big_bass_weight,buy_in,disqualified
1,Avery,8.00,4,2.50,,
2,Blake,0,0,,,
3,Casey,12.00,5,3.10,,
4,Drew,0,0,,yes,
5,Ellis,14.00,5,4.00,,true
";

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_weighin")
}

fn weighin(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .current_dir(dir.path())
        .env_remove("WEIGHIN_CONFIG")
        .env_remove("WEIGHIN_BIND")
        .env("WEIGHIN_STORE", dir.path().join("results.json"))
        .env("RUST_LOG", "warn")
        .output()
        .expect("weighin should run")
}

fn write_sheet(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("sheet should be written");
    path.display().to_string()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn unknown_command_prints_usage() {
    let dir = TempDir::new().expect("temp dir");
    let output = weighin(&dir, &["bogus"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: weighin"));
}

#[test]
fn place_command_emits_ranked_json() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(&dir, "results.csv", RESULTS_CSV);
    let output = weighin(&dir, &["place", &sheet]);

    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    let ranked = payload.as_array().expect("ranked list");
    assert_eq!(ranked.len(), 4);
    assert_eq!(ranked[0]["angler_id"], 3);
    assert_eq!(ranked[0]["calculated_points"], 100);
    assert_eq!(ranked[2]["angler_id"], 2);
    assert_eq!(ranked[2]["calculated_points"], 97);
    assert_eq!(ranked[3]["angler_id"], 4);
    assert_eq!(ranked[3]["calculated_place"], 4);
    assert_eq!(ranked[3]["calculated_points"], 95);
}

#[test]
fn place_command_renders_csv_on_request() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(&dir, "results.csv", RESULTS_CSV);
    let output = weighin(&dir, &["place", &sheet, "--csv"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert!(lines.next().is_some_and(|header| header.starts_with("place,points,angler_id")));
    assert!(lines.next().is_some_and(|row| row.starts_with("1,100,3,Casey")));
}

#[test]
fn place_command_returns_usage_without_path() {
    let dir = TempDir::new().expect("temp dir");
    let output = weighin(&dir, &["place"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: weighin place"));
}

#[test]
fn teams_command_ranks_team_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(
        &dir,
        "teams.csv",
        "team_id,angler1_id,angler2_id,total_weight,num_fish,big_bass_weight\n\
         1,10,11,9.50,6,2.00\n\
         2,12,,13.25,5,3.75\n",
    );
    let output = weighin(&dir, &["teams", &sheet]);

    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    assert_eq!(payload[0]["team_id"], 2);
    assert_eq!(payload[1]["calculated_place"], 2);
}

#[test]
fn import_then_standings_and_recalculate_use_the_store() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(&dir, "results.csv", RESULTS_CSV);

    let imported = weighin(&dir, &["import", "12", &sheet]);
    assert_eq!(imported.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&imported.stdout).contains("inserted=5"));
    assert!(dir.path().join("results.json").is_file());

    let standings = weighin(&dir, &["standings", "12"]);
    assert_eq!(standings.status.code(), Some(0));
    let payload = stdout_json(&standings);
    assert_eq!(payload["tournament_id"], 12);
    assert_eq!(payload["results"].as_array().map(Vec::len), Some(4));
    assert_eq!(payload["disqualified"][0]["angler_id"], 5);
    assert_eq!(payload["winner"]["angler_id"], 3);

    let recalculated = weighin(&dir, &["recalculate"]);
    assert_eq!(recalculated.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&recalculated.stdout).contains("placed_entries=4"));

    let stored = fs::read_to_string(dir.path().join("results.json")).expect("store file");
    let stored: serde_json::Value = serde_json::from_str(&stored).expect("store json");
    let entries = stored["tournaments"]["12"].as_array().expect("tournament entries");
    let casey = entries
        .iter()
        .find(|entry| entry["angler_id"] == 3)
        .expect("angler 3 stored");
    assert_eq!(casey["calculated_place"], 1);
    assert_eq!(casey["calculated_points"], 100);
}

#[test]
fn standings_for_unknown_tournament_fails() {
    let dir = TempDir::new().expect("temp dir");
    let output = weighin(&dir, &["standings", "404"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("has no results"));
}

#[test]
fn validate_command_flags_duplicate_anglers() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(
        &dir,
        "dupes.csv",
        "angler_id,total_weight,num_fish\n1,4.00,2\n1,5.00,3\n",
    );
    let output = weighin(&dir, &["validate", &sheet]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already has a result"));
}

#[test]
fn validate_command_passes_clean_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(&dir, "results.csv", RESULTS_CSV);
    let output = weighin(&dir, &["validate", &sheet]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn import_aborts_on_validation_errors_without_touching_store() {
    let dir = TempDir::new().expect("temp dir");
    let sheet = write_sheet(&dir, "bad.csv", "angler_id,total_weight\n1,4.00\n1,2.00\n");
    let output = weighin(&dir, &["import", "3", &sheet]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("results.json").exists());
}

#[test]
fn bad_config_file_exits_with_config_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("weighin.yaml"), "logging:\n  level: loud\n")
        .expect("config should be written");
    let output = weighin(&dir, &["recalculate"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config error"));
}
