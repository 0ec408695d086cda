use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type AnglerId = i64;
pub type TournamentId = i64;

/// One angler's weigh-in for a single tournament, as entered by the results desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    pub angler_id: AnglerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angler_name: Option<String>,
    pub total_weight: Decimal,
    #[serde(default)]
    pub num_fish: u32,
    #[serde(default)]
    pub big_bass_weight: Decimal,
    /// Reported for statistics only; placement ranks on `total_weight` as weighed.
    #[serde(default)]
    pub dead_fish_penalty: Decimal,
    #[serde(default)]
    pub buy_in: bool,
    #[serde(default)]
    pub disqualified: bool,
}

impl RawResult {
    pub fn new(angler_id: AnglerId, total_weight: Decimal) -> Self {
        Self {
            angler_id,
            angler_name: None,
            total_weight,
            num_fish: 0,
            big_bass_weight: Decimal::ZERO,
            dead_fish_penalty: Decimal::ZERO,
            buy_in: false,
            disqualified: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.angler_name = Some(name.into());
        self
    }

    pub fn with_fish(mut self, num_fish: u32, big_bass_weight: Decimal) -> Self {
        self.num_fish = num_fish;
        self.big_bass_weight = big_bass_weight;
        self
    }

    pub fn with_penalty(mut self, dead_fish_penalty: Decimal) -> Self {
        self.dead_fish_penalty = dead_fish_penalty;
        self
    }

    pub fn as_buy_in(mut self) -> Self {
        self.buy_in = true;
        self
    }

    pub fn as_disqualified(mut self) -> Self {
        self.disqualified = true;
        self
    }

    /// Which placement block this entry falls into. Disqualification beats buy-in.
    ///
    /// Returns `None` for a negative weight: no placement rule covers it, so such an
    /// entry never reaches the standings. Upstream validation rejects it first.
    pub fn category(&self) -> Option<Category> {
        if self.disqualified {
            Some(Category::Disqualified)
        } else if self.buy_in {
            Some(Category::BuyIn)
        } else if self.total_weight > Decimal::ZERO {
            Some(Category::Fish)
        } else if self.total_weight.is_zero() {
            Some(Category::Zero)
        } else {
            None
        }
    }

    /// Weight after the dead-fish penalty, floored at zero.
    pub fn net_weight(&self) -> Decimal {
        (self.total_weight - self.dead_fish_penalty).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fish,
    Zero,
    BuyIn,
    Disqualified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: RawResult,
    pub calculated_place: u32,
    pub calculated_points: i32,
}

impl RankedResult {
    pub fn angler_id(&self) -> AnglerId {
        self.result.angler_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn category_prefers_disqualification_over_buy_in() {
        let result = RawResult::new(1, dec!(0)).as_buy_in().as_disqualified();
        assert_eq!(result.category(), Some(Category::Disqualified));
    }

    #[test]
    fn buy_in_with_weight_is_still_a_buy_in() {
        let result = RawResult::new(1, dec!(4.25)).as_buy_in();
        assert_eq!(result.category(), Some(Category::BuyIn));
    }

    #[test]
    fn negative_weight_has_no_category() {
        assert_eq!(RawResult::new(1, dec!(-0.01)).category(), None);
    }

    #[test]
    fn net_weight_never_goes_below_zero() {
        let result = RawResult::new(1, dec!(1.00)).with_penalty(dec!(1.50));
        assert_eq!(result.net_weight(), Decimal::ZERO);
        let result = RawResult::new(2, dec!(12.40)).with_penalty(dec!(0.25));
        assert_eq!(result.net_weight(), dec!(12.15));
    }

    #[test]
    fn optional_fields_default_when_missing_from_json() {
        let result: RawResult =
            serde_json::from_str(r#"{"angler_id":7,"total_weight":"9.75"}"#).expect("valid json");
        assert_eq!(result.num_fish, 0);
        assert_eq!(result.big_bass_weight, Decimal::ZERO);
        assert!(!result.buy_in);
        assert!(!result.disqualified);
        assert_eq!(result.total_weight, dec!(9.75));
    }
}
