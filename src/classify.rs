use rust_decimal::{Decimal, RoundingStrategy};

/// Rating of a ratio against its band table, from deep shortfall to deep
/// overshoot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Lowest,
    Lower,
    Low,
    Neutral,
    High,
    Higher,
    Highest,
}

/// Percentage thresholds splitting ratios into statuses. `low` holds the
/// upper bounds of LOWEST, LOWER and LOW; `high` holds the lower bounds
/// of HIGHEST, HIGHER and HIGH.
pub struct Bands {
    pub low: [i64; 3],
    pub high: [i64; 3],
}

/// Commitment vs capacity rating; committing to everything the team has
/// capacity for sits exactly at 100%.
pub const COMMITMENT_BANDS: Bands = Bands {
    low: [40, 60, 80],
    high: [140, 120, 100],
};

/// Delivery vs commitment rating, stricter on the low side.
pub const DELIVERY_BANDS: Bands = Bands {
    low: [60, 80, 90],
    high: [140, 120, 100],
};

/// A classified ratio. The ratio is absent when the denominator is not
/// positive; the status then rates the bare difference instead.
#[derive(Clone, Copy, Debug)]
pub struct Summary {
    pub ratio: Option<Decimal>,
    pub status: Status,
}

impl Summary {
    pub fn compute(numerator: i64, denominator: i64, bands: &Bands) -> Self {
        if denominator > 0 {
            let ratio = (Decimal::from(numerator) / Decimal::from(denominator)
                * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            Summary {
                ratio: Some(ratio),
                status: band_status(ratio, bands),
            }
        } else {
            Summary {
                ratio: None,
                status: difference_status(numerator - denominator),
            }
        }
    }
}

fn band_status(ratio: Decimal, bands: &Bands) -> Status {
    if ratio < Decimal::from(bands.low[0]) {
        Status::Lowest
    } else if ratio < Decimal::from(bands.low[1]) {
        Status::Lower
    } else if ratio < Decimal::from(bands.low[2]) {
        Status::Low
    } else if ratio > Decimal::from(bands.high[0]) {
        Status::Highest
    } else if ratio > Decimal::from(bands.high[1]) {
        Status::Higher
    } else if ratio > Decimal::from(bands.high[2]) {
        Status::High
    } else {
        Status::Neutral
    }
}

/// Rating used when no ratio can be formed, e.g. story points were
/// committed against zero capacity.
fn difference_status(difference: i64) -> Status {
    if difference > 20 {
        Status::Highest
    } else if difference > 10 {
        Status::Higher
    } else if difference > 0 {
        Status::High
    } else {
        Status::Neutral
    }
}
