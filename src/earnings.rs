//! Prorates a salary over a clock interval.

use std::fmt::Display;

use time::{Time, macros::format_description};

use crate::{
    currency::{Currency, Money, format_currency},
    salary::SalaryConfig,
};

/// The smallest salary amount accepted by the calculator.
pub const MIN_SALARY_AMOUNT: f64 = 1.0;
/// The largest salary amount accepted by the calculator.
pub const MAX_SALARY_AMOUNT: f64 = 99_999.0;

/// A salary amount within [MIN_SALARY_AMOUNT] and [MAX_SALARY_AMOUNT].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryAmount(f64);

impl SalaryAmount {
    /// Clamp `amount` into the accepted range.
    ///
    /// Returns `None` for non-finite amounts.
    pub fn clamped(amount: f64) -> Option<Self> {
        amount
            .is_finite()
            .then(|| Self(amount.clamp(MIN_SALARY_AMOUNT, MAX_SALARY_AMOUNT)))
    }

    /// Parse and clamp a salary amount typed into a form.
    ///
    /// Empty or unreadable text is treated as a missing amount.
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<f64>().ok().and_then(Self::clamped)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// A wall clock time in "HH:MM" form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime(Time);

impl ClockTime {
    /// Parse a time like "08:30". Returns `None` if `text` is not a valid 24 hour time.
    pub fn parse(text: &str) -> Option<Self> {
        Time::parse(text.trim(), format_description!("[hour]:[minute]"))
            .ok()
            .map(Self)
    }

    /// Hours from `self` until `end` on the same day.
    ///
    /// Negative when `end` is earlier than `self`, there is no rollover past midnight.
    pub fn hours_until(self, end: ClockTime) -> f64 {
        (end.0 - self.0).as_seconds_f64() / 3600.0
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

/// The calculator input. Any field may be missing while the user is typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarningsInput {
    pub salary_amount: Option<SalaryAmount>,
    pub currency: Currency,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// The amount earned over an interval, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Earnings {
    pub raw_amount: f64,
    pub currency: Currency,
}

impl Earnings {
    /// The amount rounded to cents, as it is stored in the history.
    pub fn money(&self) -> Money {
        Money::new(self.raw_amount, self.currency)
    }

    /// The amount formatted for display, e.g. "R$25.00".
    pub fn formatted(&self) -> String {
        format_currency(self.raw_amount, self.currency)
    }
}

/// The outcome of a calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EarningsResult {
    /// The salary, start or end time is missing.
    NoInput,
    /// A time could not be read, so no amount can be given.
    Unavailable,
    Earned(Earnings),
}

/// Calculate how much was earned between the start and end times of `input`.
pub fn calculate_interval_earnings(input: &EarningsInput, config: &SalaryConfig) -> EarningsResult {
    let (Some(salary_amount), Some(start), Some(end)) = (
        input.salary_amount,
        non_empty(input.start.as_deref()),
        non_empty(input.end.as_deref()),
    ) else {
        return EarningsResult::NoInput;
    };

    let (Some(start), Some(end)) = (ClockTime::parse(start), ClockTime::parse(end)) else {
        return EarningsResult::Unavailable;
    };

    let interval_hours = start.hours_until(end);
    let hourly_rate = config.hourly_rate(salary_amount.get());

    EarningsResult::Earned(Earnings {
        raw_amount: interval_hours * hourly_rate,
        currency: input.currency,
    })
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}
