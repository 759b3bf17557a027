//! Validity period of a tariff: a year plus a non-empty set of months.
//!
//! Months are a closed enumeration ordered by calendar month, so the two-digit
//! codes `"01".."12"` sort the same way lexicographically and chronologically.

use crate::errors::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    /// January (`"01"`)
    January,
    /// February (`"02"`)
    February,
    /// March (`"03"`)
    March,
    /// April (`"04"`)
    April,
    /// May (`"05"`)
    May,
    /// June (`"06"`)
    June,
    /// July (`"07"`)
    July,
    /// August (`"08"`)
    August,
    /// September (`"09"`)
    September,
    /// October (`"10"`)
    October,
    /// November (`"11"`)
    November,
    /// December (`"12"`)
    December,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Month number, 1 for January through 12 for December
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Zero-padded two-digit code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::January => "01",
            Self::February => "02",
            Self::March => "03",
            Self::April => "04",
            Self::May => "05",
            Self::June => "06",
            Self::July => "07",
            Self::August => "08",
            Self::September => "09",
            Self::October => "10",
            Self::November => "11",
            Self::December => "12",
        }
    }

    /// Month for a number in `1..=12`
    #[must_use]
    pub fn from_number(number: u32) -> Option<Self> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    /// Month for a two-digit code; surrounding whitespace is ignored
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|month| month.code() == code)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Decimal form of a numeric year, so `"02025"`, `"+2025"` and `"2025"` all
/// store and group as `"2025"`.
fn canonical_year(year: &str) -> Option<String> {
    year.trim().parse::<i32>().ok().map(|number| number.to_string())
}

/// A tariff's validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    year: String,
    months: BTreeSet<Month>,
}

impl Period {
    /// Builds a validated period.
    ///
    /// Rejects a non-numeric year, an empty month set and unknown month codes.
    pub fn new<I, S>(year: &str, month_codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let year = year.trim();
        if year.is_empty() {
            return Err(Error::validation("year", "year is required"));
        }
        let Some(year) = canonical_year(year) else {
            return Err(Error::validation(
                "year",
                format!("`{year}` is not a numeric year"),
            ));
        };

        let mut months = BTreeSet::new();
        for code in month_codes {
            let code = code.as_ref();
            let month = Month::from_code(code).ok_or_else(|| {
                Error::validation("months", format!("`{code}` is not a month code"))
            })?;
            months.insert(month);
        }
        if months.is_empty() {
            return Err(Error::validation(
                "months",
                "at least one month is required",
            ));
        }

        Ok(Self { year, months })
    }

    /// Rebuilds a period from stored columns without validating it.
    ///
    /// Stored rows may predate validation, so an unparseable year is kept as-is and
    /// unknown month codes are dropped with a warning. A numeric year is
    /// canonicalized the same way as in [`Period::new`].
    #[must_use]
    pub fn from_stored(year: &str, months_csv: &str) -> Self {
        let mut months = BTreeSet::new();
        for code in months_csv.split(',').filter(|code| !code.trim().is_empty()) {
            match Month::from_code(code) {
                Some(month) => {
                    months.insert(month);
                }
                None => tracing::warn!("Ignoring unknown month code `{code}` in stored period"),
            }
        }
        let year = canonical_year(year).unwrap_or_else(|| year.trim().to_string());
        Self { year, months }
    }

    /// The year, in canonical decimal form when numeric
    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    /// Months in calendar order
    pub fn months(&self) -> impl Iterator<Item = Month> + '_ {
        self.months.iter().copied()
    }

    /// Earliest month of the window; only `None` for a stored row with no months
    #[must_use]
    pub fn earliest_month(&self) -> Option<Month> {
        self.months.first().copied()
    }

    /// Whether the window includes the month with the given code
    #[must_use]
    pub fn contains(&self, month_code: &str) -> bool {
        Month::from_code(month_code).is_some_and(|month| self.months.contains(&month))
    }

    /// Storage form: comma-joined codes in calendar order
    #[must_use]
    pub fn months_csv(&self) -> String {
        self.months
            .iter()
            .map(|month| month.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}
