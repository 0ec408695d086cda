//! Single-tournament placement: fish-catchers by weight, then the zero-weight block,
//! then the buy-in block.

use tracing::debug;

use crate::placement::record::{Category, RankedResult, RawResult};

/// Points for first place among fish-catchers; each later place is worth one less.
pub const FIRST_PLACE_POINTS: i32 = 100;
/// Zero-weight anglers score this much below the last fish-catcher.
pub const ZERO_WEIGHT_PENALTY: i32 = 2;
/// Buy-ins score this much below the lowest fish-catcher.
pub const BUY_IN_PENALTY: i32 = 4;
/// Zero-weight points when nobody weighed fish.
pub const ZERO_WEIGHT_FALLBACK_POINTS: i32 = 98;
/// Buy-in points when nobody weighed fish, whether or not zero-weight anglers exist.
pub const BUY_IN_FALLBACK_POINTS: i32 = 95;
/// Place given to the zero and buy-in blocks when nobody weighed fish.
pub const FALLBACK_PLACE: u32 = 1;

/// Entries of one tournament split by placement block, each in input order.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub fish: Vec<&'a RawResult>,
    pub zero: Vec<&'a RawResult>,
    pub buy_ins: Vec<&'a RawResult>,
    pub disqualified: Vec<&'a RawResult>,
}

pub fn partition(results: &[RawResult]) -> Partition<'_> {
    let mut groups = Partition::default();
    for result in results {
        match result.category() {
            Some(Category::Fish) => groups.fish.push(result),
            Some(Category::Zero) => groups.zero.push(result),
            Some(Category::BuyIn) => groups.buy_ins.push(result),
            Some(Category::Disqualified) => groups.disqualified.push(result),
            None => {}
        }
    }
    groups
}

pub fn fish_points(place: u32) -> i32 {
    let place = i32::try_from(place).unwrap_or(i32::MAX);
    (FIRST_PLACE_POINTS + 1).saturating_sub(place)
}

/// Rank one tournament's results and assign points.
///
/// Fish-catchers are ordered by `total_weight` descending with a stable sort, so equal
/// weights keep their input order and still receive consecutive places and points.
/// Zero-weight anglers and buy-ins each share a single place and points value. Disqualified
/// entries are left out; reporting them is up to the caller.
pub fn place_results(results: &[RawResult]) -> Vec<RankedResult> {
    let Partition {
        mut fish,
        zero,
        buy_ins,
        disqualified,
    } = partition(results);

    fish.sort_by(|left, right| right.total_weight.cmp(&left.total_weight));

    let mut ranked = Vec::with_capacity(fish.len() + zero.len() + buy_ins.len());
    for (index, result) in fish.iter().enumerate() {
        let place = place_after(index);
        ranked.push(RankedResult {
            result: (*result).clone(),
            calculated_place: place,
            calculated_points: fish_points(place),
        });
    }

    // Fish points strictly decrease, so the last fish-catcher holds the minimum.
    let lowest_fish_points = ranked.last().map(|last| last.calculated_points);
    let after_fish = place_after(fish.len());

    let zero_place = match lowest_fish_points {
        Some(_) => after_fish,
        None => FALLBACK_PLACE,
    };
    let zero_points = match lowest_fish_points {
        Some(points) => points - ZERO_WEIGHT_PENALTY,
        None => ZERO_WEIGHT_FALLBACK_POINTS,
    };
    ranked.extend(zero.iter().map(|result| RankedResult {
        result: (*result).clone(),
        calculated_place: zero_place,
        calculated_points: zero_points,
    }));

    let (buy_in_place, buy_in_points) = match lowest_fish_points {
        Some(points) if zero.is_empty() => (after_fish, points - BUY_IN_PENALTY),
        Some(points) => (zero_place + 1, points - BUY_IN_PENALTY),
        None => (FALLBACK_PLACE, BUY_IN_FALLBACK_POINTS),
    };
    ranked.extend(buy_ins.iter().map(|result| RankedResult {
        result: (*result).clone(),
        calculated_place: buy_in_place,
        calculated_points: buy_in_points,
    }));

    debug!(
        fish = fish.len(),
        zero = zero.len(),
        buy_ins = buy_ins.len(),
        disqualified = disqualified.len(),
        "placed tournament results"
    );

    ranked
}

fn place_after(count: usize) -> u32 {
    u32::try_from(count).map_or(u32::MAX, |count| count.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn places(ranked: &[RankedResult]) -> Vec<(i64, u32, i32)> {
        ranked
            .iter()
            .map(|r| (r.angler_id(), r.calculated_place, r.calculated_points))
            .collect()
    }

    #[test]
    fn fish_points_count_down_from_one_hundred() {
        assert_eq!(fish_points(1), 100);
        assert_eq!(fish_points(2), 99);
        assert_eq!(fish_points(101), 0);
        assert_eq!(fish_points(105), -4);
    }

    #[test]
    fn partition_puts_every_entry_in_one_block() {
        let results = vec![
            RawResult::new(1, dec!(3.5)),
            RawResult::new(2, dec!(0)),
            RawResult::new(3, dec!(0)).as_buy_in(),
            RawResult::new(4, dec!(7)).as_disqualified(),
            RawResult::new(5, dec!(0)).as_buy_in().as_disqualified(),
        ];
        let groups = partition(&results);
        assert_eq!(groups.fish.len(), 1);
        assert_eq!(groups.zero.len(), 1);
        assert_eq!(groups.buy_ins.len(), 1);
        assert_eq!(groups.disqualified.len(), 2);
    }

    #[test]
    fn zero_and_buy_in_blocks_follow_fish_in_order() {
        let results = vec![
            RawResult::new(10, dec!(0)).as_buy_in(),
            RawResult::new(11, dec!(0)),
            RawResult::new(12, dec!(5.10)),
            RawResult::new(13, dec!(9.80)),
            RawResult::new(14, dec!(0)),
        ];
        let ranked = place_results(&results);
        assert_eq!(
            places(&ranked),
            vec![
                (13, 1, 100),
                (12, 2, 99),
                (11, 3, 97),
                (14, 3, 97),
                (10, 4, 95),
            ]
        );
    }

    #[test]
    fn buy_ins_without_fish_use_fallback_even_with_zero_block() {
        let results = vec![
            RawResult::new(1, dec!(0)),
            RawResult::new(2, dec!(0)).as_buy_in(),
        ];
        let ranked = place_results(&results);
        assert_eq!(places(&ranked), vec![(1, 1, 98), (2, 1, 95)]);
    }

    #[test]
    fn only_buy_ins_take_place_one_with_fallback_points() {
        let results = vec![
            RawResult::new(1, dec!(0)).as_buy_in(),
            RawResult::new(2, dec!(0)).as_buy_in(),
        ];
        let ranked = place_results(&results);
        assert_eq!(places(&ranked), vec![(1, 1, 95), (2, 1, 95)]);
    }

    #[test]
    fn deep_fields_push_points_negative() {
        let results: Vec<RawResult> = (0..103)
            .map(|i| RawResult::new(i, rust_decimal::Decimal::from(200 - i)))
            .chain(std::iter::once(RawResult::new(500, dec!(0))))
            .collect();
        let ranked = place_results(&results);
        let last_fish = &ranked[102];
        assert_eq!(last_fish.calculated_place, 103);
        assert_eq!(last_fish.calculated_points, -2);
        let zero = ranked.last().expect("zero entry");
        assert_eq!(zero.calculated_place, 104);
        assert_eq!(zero.calculated_points, -4);
    }

    #[test]
    fn duplicate_anglers_are_ranked_independently() {
        let results = vec![RawResult::new(1, dec!(4)), RawResult::new(1, dec!(6))];
        let ranked = place_results(&results);
        assert_eq!(places(&ranked), vec![(1, 1, 100), (1, 2, 99)]);
    }

    #[test]
    fn negative_weights_are_not_placed() {
        let results = vec![RawResult::new(1, dec!(-1)), RawResult::new(2, dec!(2))];
        let ranked = place_results(&results);
        assert_eq!(places(&ranked), vec![(2, 1, 100)]);
    }

    #[test]
    fn trailing_zeros_do_not_affect_weight_order() {
        let results = vec![
            RawResult::new(1, dec!(10.5)),
            RawResult::new(2, dec!(10.50)),
            RawResult::new(3, dec!(10.501)),
        ];
        let ranked = place_results(&results);
        assert_eq!(places(&ranked), vec![(3, 1, 100), (1, 2, 99), (2, 3, 98)]);
    }
}
