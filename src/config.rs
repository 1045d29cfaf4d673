use crate::calendar;
use crate::simulation::SimulationInput;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

/// Longest horizon accepted; keeps every withdrawal date representable.
pub const MAX_SIMULATION_YEARS: u32 = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Debt + Equity allocation must equal 100% (got {debt}% + {equity}%)")]
    AllocationMismatch { debt: f64, equity: f64 },

    #[error("Please select both investment start date and SWP start date")]
    MissingDates,

    #[error("SWP start date must be on or after investment start date ({swp} is before {start})")]
    SwpBeforeStart { start: NaiveDate, swp: NaiveDate },

    #[error("Simulation years must be at most {max} (got {years})")]
    TooManyYears { years: u32, max: u32 },
}

#[derive(Debug, Deserialize, Clone, Default)]
struct Allocation {
    #[serde(default)]
    debt_percent: f64,

    #[serde(default)]
    equity_percent: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
struct Rates {
    #[serde(default)]
    debt_return: f64,

    #[serde(default)]
    equity_return: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
struct Withdrawals {
    #[serde(default)]
    enable_swp: bool,

    #[serde(default, alias = "swp_monthly_amount")]
    swp_amount: f64,

    #[serde(default, alias = "swp_step_up")]
    swp_increase: f64,

    #[serde(default, deserialize_with = "optional_date")]
    swp_start_date: Option<NaiveDate>,
}

/// Raw inputs as read from the config file. Missing numbers count as zero.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    invested_amount: f64,

    #[serde(default, deserialize_with = "optional_date")]
    start_date: Option<NaiveDate>,

    #[serde(default, alias = "years")]
    simulation_years: u32,

    #[serde(flatten)]
    allocation: Allocation,

    #[serde(flatten)]
    rates: Rates,

    #[serde(flatten)]
    withdrawals: Withdrawals,
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            calendar::parse_date(&s).map_err(|e| {
                <D::Error as de::Error>::custom(format!("invalid date `{}`: {}", s, e))
            })
        })
        .transpose()
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn with_years(self, simulation_years: u32) -> Self {
        Self {
            simulation_years,
            ..self
        }
    }

    /// Whether there is anything worth projecting: some money, some horizon
    /// and some allocation.
    pub fn has_basic_inputs(&self) -> bool {
        self.invested_amount > 0.0
            && self.simulation_years > 0
            && (self.allocation.debt_percent > 0.0 || self.allocation.equity_percent > 0.0)
    }

    pub fn validate(&self) -> Result<SimulationInput, ValidationError> {
        let debt_percent = self.allocation.debt_percent;
        let equity_percent = self.allocation.equity_percent;

        if debt_percent + equity_percent != 100.0 {
            return Err(ValidationError::AllocationMismatch {
                debt: debt_percent,
                equity: equity_percent,
            });
        }

        let (start_date, swp_start_date) =
            match (self.start_date, self.withdrawals.swp_start_date) {
                (Some(start), Some(swp)) => (start, swp),
                _ => return Err(ValidationError::MissingDates),
            };

        if swp_start_date < start_date {
            return Err(ValidationError::SwpBeforeStart {
                start: start_date,
                swp: swp_start_date,
            });
        }

        if self.simulation_years > MAX_SIMULATION_YEARS {
            return Err(ValidationError::TooManyYears {
                years: self.simulation_years,
                max: MAX_SIMULATION_YEARS,
            });
        }

        Ok(SimulationInput {
            invested_amount: self.invested_amount,
            start_date,
            swp_start_date,
            simulation_years: self.simulation_years,
            debt_percent,
            equity_percent,
            debt_return: self.rates.debt_return,
            equity_return: self.rates.equity_return,
            enable_swp: self.withdrawals.enable_swp,
            swp_amount: self.withdrawals.swp_amount,
            swp_increase: self.withdrawals.swp_increase,
        })
    }
}
