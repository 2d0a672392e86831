//! Core salary domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    language::Phrase,
    store::{KeyValueStore, SALARY_CONFIG_KEY, load_json, save_json},
};

/// How often the salary amount is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Hourly,
    #[default]
    Monthly,
    Yearly,
}

impl Periodicity {
    pub const ALL: [Periodicity; 3] = [
        Periodicity::Hourly,
        Periodicity::Monthly,
        Periodicity::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Periodicity::Hourly => "hourly",
            Periodicity::Monthly => "monthly",
            Periodicity::Yearly => "yearly",
        }
    }

    pub(crate) fn phrase(self) -> Phrase {
        match self {
            Periodicity::Hourly => Phrase::Hourly,
            Periodicity::Monthly => Phrase::Monthly,
            Periodicity::Yearly => Phrase::Yearly,
        }
    }
}

impl FromStr for Periodicity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Periodicity::Hourly),
            "monthly" => Ok(Periodicity::Monthly),
            "yearly" => Ok(Periodicity::Yearly),
            other => Err(Error::InvalidPeriodicity(other.to_owned())),
        }
    }
}

impl Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A number of hours worked per week, always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct HoursPerWeek(u32);

impl HoursPerWeek {
    /// Create the hours per week.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidHoursPerWeek] if `hours` is zero.
    pub fn new(hours: u32) -> Result<Self, Error> {
        if hours == 0 {
            Err(Error::InvalidHoursPerWeek(hours.to_string()))
        } else {
            Ok(Self(hours))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for HoursPerWeek {
    fn default() -> Self {
        Self(44)
    }
}

impl TryFrom<u32> for HoursPerWeek {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        HoursPerWeek::new(value)
    }
}

impl From<HoursPerWeek> for u32 {
    fn from(value: HoursPerWeek) -> Self {
        value.0
    }
}

impl FromStr for HoursPerWeek {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| Error::InvalidHoursPerWeek(s.to_owned()))
            .and_then(HoursPerWeek::new)
    }
}

impl Display for HoursPerWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the salary amount entered in the calculator is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalaryConfig {
    pub periodicity: Periodicity,
    pub hours_per_week: HoursPerWeek,
}

impl SalaryConfig {
    /// The pay for one hour of work given a salary paid once per period.
    ///
    /// A month is taken to be four weeks and a year twelve such months.
    pub fn hourly_rate(&self, salary_amount: f64) -> f64 {
        let hours_per_week = f64::from(self.hours_per_week.get());

        match self.periodicity {
            Periodicity::Hourly => salary_amount,
            Periodicity::Monthly => salary_amount / (hours_per_week * 4.0),
            Periodicity::Yearly => salary_amount / (hours_per_week * 4.0 * 12.0),
        }
    }
}

/// Get the stored salary config, or the default of 44 hours per week paid monthly.
pub fn load_salary_config(store: &impl KeyValueStore) -> Result<SalaryConfig, Error> {
    load_json(store, SALARY_CONFIG_KEY)
}

/// Store the salary config.
pub fn save_salary_config(config: &SalaryConfig, store: &impl KeyValueStore) -> Result<(), Error> {
    save_json(store, SALARY_CONFIG_KEY, config)
}
