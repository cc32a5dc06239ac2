//! Cost model: commission and exchange fee calculation.
//!
//! Both are symmetric across buy and sell and both are zero when either the
//! quantity or the price is zero. Amounts are rounded to 4 decimal places.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::rounding::round;

/// Commission charged on one fill.
pub trait CommissionModel: Send + Sync + fmt::Debug {
    fn commission(&self, quantity: f64, price: f64) -> f64;
}

/// Exchange fee charged on one fill.
pub trait FeeModel: Send + Sync + fmt::Debug {
    fn fee(&self, quantity: f64, price: f64) -> f64;
}

/// Built-in commission schedules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Commission {
    #[default]
    None,
    /// Flat amount per fill.
    Fixed { amount: f64 },
    /// Flat amount per fill, waived when the traded value is below `min_value`.
    ThresholdFixed { amount: f64, min_value: f64 },
    /// Fraction of traded value (`0.001` = 10 bps).
    Percentage { rate: f64 },
    /// Fraction of traded value, clamped to `[min, max]`.
    ValueBounded { rate: f64, min: f64, max: f64 },
}

impl Commission {
    /// Setup-time parameter checks.
    pub fn validate(&self) -> Result<(), String> {
        let ok = match *self {
            Self::None => true,
            Self::Fixed { amount } => amount >= 0.0,
            Self::ThresholdFixed { amount, min_value } => amount >= 0.0 && min_value >= 0.0,
            Self::Percentage { rate } => rate >= 0.0,
            Self::ValueBounded { rate, min, max } => rate >= 0.0 && min >= 0.0 && min <= max,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("invalid commission parameters: {self:?}"))
        }
    }
}

impl CommissionModel for Commission {
    fn commission(&self, quantity: f64, price: f64) -> f64 {
        if quantity == 0.0 || price == 0.0 {
            return 0.0;
        }
        let value = (quantity * price).abs();
        let amount = match *self {
            Self::None => 0.0,
            Self::Fixed { amount } => amount,
            Self::ThresholdFixed { amount, min_value } => {
                if value < min_value {
                    0.0
                } else {
                    amount
                }
            }
            Self::Percentage { rate } => value * rate,
            Self::ValueBounded { rate, min, max } => (value * rate).max(min).min(max),
        };
        round(amount)
    }
}

/// Built-in exchange fee schedules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeFee {
    #[default]
    None,
    /// Flat amount per fill.
    Fixed { amount: f64 },
}

impl ExchangeFee {
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Fixed { amount } if amount < 0.0 => {
                Err(format!("exchange fee must be non-negative, got {amount}"))
            }
            _ => Ok(()),
        }
    }
}

impl FeeModel for ExchangeFee {
    fn fee(&self, quantity: f64, price: f64) -> f64 {
        if quantity == 0.0 || price == 0.0 {
            return 0.0;
        }
        match *self {
            Self::None => 0.0,
            Self::Fixed { amount } => round(amount),
        }
    }
}
