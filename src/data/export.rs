//! CSV rendering of standings for the results board and spreadsheet users.

use std::io::Write;

use serde::Serialize;

use crate::placement::{RankedResult, RankedTeamResult};

const STANDINGS_HEADER: [&str; 8] = [
    "place",
    "points",
    "angler_id",
    "angler_name",
    "total_weight",
    "num_fish",
    "big_bass_weight",
    "buy_in",
];

const TEAM_STANDINGS_HEADER: [&str; 8] = [
    "place",
    "team_id",
    "angler1_id",
    "angler2_id",
    "solo",
    "total_weight",
    "num_fish",
    "big_bass_weight",
];

#[derive(Debug, Serialize)]
struct StandingsRow<'a> {
    place: u32,
    points: i32,
    angler_id: i64,
    angler_name: &'a str,
    total_weight: String,
    num_fish: u32,
    big_bass_weight: String,
    buy_in: bool,
}

#[derive(Debug, Serialize)]
struct TeamStandingsRow {
    place: u32,
    team_id: i64,
    angler1_id: i64,
    angler2_id: Option<i64>,
    solo: bool,
    total_weight: String,
    num_fish: u32,
    big_bass_weight: String,
}

pub fn write_standings_csv(writer: impl Write, ranked: &[RankedResult]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    // serialize() only emits the header alongside the first row.
    if ranked.is_empty() {
        csv_writer.write_record(STANDINGS_HEADER)?;
    }
    for entry in ranked {
        let result = &entry.result;
        csv_writer.serialize(StandingsRow {
            place: entry.calculated_place,
            points: entry.calculated_points,
            angler_id: result.angler_id,
            angler_name: result.angler_name.as_deref().unwrap_or(""),
            total_weight: result.total_weight.to_string(),
            num_fish: result.num_fish,
            big_bass_weight: result.big_bass_weight.to_string(),
            buy_in: result.buy_in,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_team_standings_csv(
    writer: impl Write,
    ranked: &[RankedTeamResult],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if ranked.is_empty() {
        csv_writer.write_record(TEAM_STANDINGS_HEADER)?;
    }
    for entry in ranked {
        let team = &entry.team;
        csv_writer.serialize(TeamStandingsRow {
            place: entry.calculated_place,
            team_id: team.team_id,
            angler1_id: team.angler1_id,
            angler2_id: team.angler2_id,
            solo: team.is_solo(),
            total_weight: team.total_weight.to_string(),
            num_fish: team.num_fish,
            big_bass_weight: team.big_bass_weight.to_string(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn standings_csv_string(ranked: &[RankedResult]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_standings_csv(&mut buffer, ranked)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn team_standings_csv_string(ranked: &[RankedTeamResult]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_team_standings_csv(&mut buffer, ranked)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::{place_results, rank_teams, RawResult, TeamResult};
    use rust_decimal_macros::dec;

    #[test]
    fn standings_csv_has_header_and_one_row_per_angler() {
        let results = vec![
            RawResult::new(2, dec!(0)).as_buy_in(),
            RawResult::new(1, dec!(12.30)).with_name("Pat").with_fish(5, dec!(4.05)),
        ];
        let csv = standings_csv_string(&place_results(&results)).expect("csv should render");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "place,points,angler_id,angler_name,total_weight,num_fish,big_bass_weight,buy_in"
        );
        assert_eq!(lines[1], "1,100,1,Pat,12.30,5,4.05,false");
        assert_eq!(lines[2], "2,96,2,,0,0,0,true");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn team_csv_marks_solo_teams() {
        let teams = vec![TeamResult {
            team_id: 9,
            angler1_id: 4,
            angler2_id: None,
            total_weight: dec!(7.5),
            num_fish: 3,
            big_bass_weight: dec!(3.1),
        }];
        let csv = team_standings_csv_string(&rank_teams(&teams)).expect("csv should render");
        assert!(csv.lines().nth(1).is_some_and(|row| row == "1,9,4,,true,7.5,3,3.1"));
    }

    #[test]
    fn empty_standings_still_carry_a_header() {
        let csv = standings_csv_string(&[]).expect("csv should render");
        assert_eq!(
            csv,
            "place,points,angler_id,angler_name,total_weight,num_fish,big_bass_weight,buy_in\n"
        );

        let teams = team_standings_csv_string(&[]).expect("csv should render");
        assert_eq!(
            teams,
            "place,team_id,angler1_id,angler2_id,solo,total_weight,num_fish,big_bass_weight\n"
        );
    }

    #[test]
    fn header_matches_serialized_columns() {
        let results = vec![RawResult::new(1, dec!(2.0))];
        let csv = standings_csv_string(&place_results(&results)).expect("csv should render");
        assert_eq!(csv.lines().next(), Some(STANDINGS_HEADER.join(",").as_str()));

        let teams = vec![TeamResult {
            team_id: 1,
            angler1_id: 2,
            angler2_id: Some(3),
            total_weight: dec!(1.0),
            num_fish: 1,
            big_bass_weight: dec!(1.0),
        }];
        let csv = team_standings_csv_string(&rank_teams(&teams)).expect("csv should render");
        assert_eq!(csv.lines().next(), Some(TEAM_STANDINGS_HEADER.join(",").as_str()));
    }
}
