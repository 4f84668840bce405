use serde::{Deserialize, Serialize};

/// Net vote score used as the `hot` ranking key.
pub fn temperature(upvotes: u32, downvotes: u32) -> i64 {
    i64::from(upvotes) - i64::from(downvotes)
}

/// Percentage saved relative to the original price, rounded to the nearest
/// whole percent. Zero when there is no real discount.
pub fn discount_percent(price: f64, original_price: f64) -> u32 {
    if !price.is_finite() || !original_price.is_finite() {
        return 0;
    }
    if original_price <= 0.0 || price < 0.0 || price >= original_price {
        return 0;
    }

    ((original_price - price) / original_price * 100.0).round() as u32
}

/// Display bucket for a temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatTier {
    Cold,
    Warm,
    Hot,
    Scorching,
}

impl HeatTier {
    pub fn of(temperature: i64) -> Self {
        match temperature {
            t if t >= 300 => HeatTier::Scorching,
            t if t >= 200 => HeatTier::Hot,
            t if t >= 100 => HeatTier::Warm,
            _ => HeatTier::Cold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_net_votes() {
        for (up, down) in [(0, 0), (10, 2), (2, 10), (342, 12), (u32::MAX, 0), (0, u32::MAX)] {
            assert_eq!(temperature(up, down), up as i64 - down as i64);
        }
    }

    #[test]
    fn discount_matches_listed_percentages() {
        assert_eq!(discount_percent(199.0, 249.0), 20);
        assert_eq!(discount_percent(1299.0, 1799.0), 28);
        assert_eq!(discount_percent(348.0, 399.0), 13);
    }

    #[test]
    fn no_discount_without_a_cheaper_price() {
        assert_eq!(discount_percent(100.0, 100.0), 0);
        assert_eq!(discount_percent(120.0, 100.0), 0);
        assert_eq!(discount_percent(10.0, 0.0), 0);
        assert_eq!(discount_percent(f64::NAN, 100.0), 0);
    }

    #[test]
    fn heat_tiers_use_hundred_steps() {
        assert_eq!(HeatTier::of(-5), HeatTier::Cold);
        assert_eq!(HeatTier::of(99), HeatTier::Cold);
        assert_eq!(HeatTier::of(100), HeatTier::Warm);
        assert_eq!(HeatTier::of(210), HeatTier::Hot);
        assert_eq!(HeatTier::of(300), HeatTier::Scorching);
    }
}
