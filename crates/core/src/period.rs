//! Billing periods derived from monthly sheet names.
//!
//! A monthly sheet is named `<MonthName><optional whitespace><4-digit year>`,
//! e.g. `March2024` or `March 2024`. Month names are the twelve English names,
//! matched exactly and case-sensitively.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DomainError;

/// One of the twelve canonical month names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// 1-based month number (January = 1).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialOrd for Month {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Month {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number().cmp(&other.number())
    }
}

impl FromStr for Month {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| PeriodParseError::UnknownMonth(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    #[error("sheet name does not start with a month name: {0:?}")]
    UnknownMonth(String),

    #[error("sheet name does not end with a 4-digit year: {0:?}")]
    MissingYear(String),
}

impl From<PeriodParseError> for DomainError {
    fn from(_: PeriodParseError) -> Self {
        DomainError::validation("Invalid sheet name format")
    }
}

/// The month and year an invoice covers.
///
/// Ordered chronologically: by year, then by month.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoicePeriod {
    pub month: Month,
    pub year: u16,
}

impl InvoicePeriod {
    pub fn new(month: Month, year: u16) -> Self {
        Self { month, year }
    }

    /// Parse a sheet name such as `"March2024"` or `"March 2024"`.
    pub fn parse(sheet_name: &str) -> Result<Self, PeriodParseError> {
        let (month, rest) = Month::ALL
            .into_iter()
            .find_map(|m| sheet_name.strip_prefix(m.name()).map(|rest| (m, rest)))
            .ok_or_else(|| PeriodParseError::UnknownMonth(sheet_name.to_string()))?;

        let digits = rest.trim_start();
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PeriodParseError::MissingYear(sheet_name.to_string()));
        }
        let year = digits
            .parse::<u16>()
            .map_err(|_| PeriodParseError::MissingYear(sheet_name.to_string()))?;

        Ok(Self { month, year })
    }

    /// Whether `sheet_name` has the monthly shape.
    pub fn is_monthly_sheet(sheet_name: &str) -> bool {
        Self::parse(sheet_name).is_ok()
    }

    /// Compact label used in file names, e.g. `March2024`.
    pub fn compact(&self) -> String {
        format!("{}{}", self.month, self.year)
    }
}

impl fmt::Display for InvoicePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

impl PartialOrd for InvoicePeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InvoicePeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month).cmp(&(other.year, other.month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_with_and_without_space() {
        let expected = InvoicePeriod::new(Month::March, 2024);
        assert_eq!(InvoicePeriod::parse("March2024").unwrap(), expected);
        assert_eq!(InvoicePeriod::parse("March 2024").unwrap(), expected);
        assert_eq!(InvoicePeriod::parse("March   2024").unwrap(), expected);
    }

    #[test]
    fn rejects_non_monthly_names() {
        let rejected = [
            "Sheet1",
            "January",
            "Data2024",
            "march2024",
            "March 24",
            "March20245",
            " March2024",
            "March2024 ",
        ];
        for name in rejected {
            assert!(InvoicePeriod::parse(name).is_err(), "{name} should not parse");
        }
    }

    #[test]
    fn malformed_period_maps_to_validation_error() {
        let err: DomainError = InvoicePeriod::parse("Sheet1").unwrap_err().into();
        assert_eq!(err, DomainError::validation("Invalid sheet name format"));
    }

    #[test]
    fn ordering_is_year_then_month() {
        let dec_2023 = InvoicePeriod::new(Month::December, 2023);
        let jan_2024 = InvoicePeriod::new(Month::January, 2024);
        let feb_2024 = InvoicePeriod::new(Month::February, 2024);
        assert!(dec_2023 < jan_2024);
        assert!(jan_2024 < feb_2024);
    }

    #[test]
    fn compact_and_display_labels() {
        let p = InvoicePeriod::new(Month::June, 2025);
        assert_eq!(p.compact(), "June2025");
        assert_eq!(p.to_string(), "June 2025");
    }

    proptest! {
        #[test]
        fn every_month_and_year_round_trips(
            idx in 0usize..12,
            year in 1000u16..=9999,
            spaced in any::<bool>(),
        ) {
            let month = Month::ALL[idx];
            let name = if spaced { format!("{month} {year}") } else { format!("{month}{year}") };
            prop_assert_eq!(InvoicePeriod::parse(&name).unwrap(), InvoicePeriod::new(month, year));
        }
    }
}
