//! Budget period (year + month)

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// A calendar month used by period-scoped endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: u32,
}

impl Period {
    /// Create a period, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_input(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The current month in local time
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// The month before this one
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Query parameters used by the report endpoints
    pub fn query_params(&self) -> Vec<(String, String)> {
        vec![
            ("anio".to_string(), self.year.to_string()),
            ("mes".to_string(), self.month.to_string()),
        ]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Parse `YYYY-MM` (also accepts `YYYY/MM`)
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once(['-', '/'])
            .ok_or_else(|| Error::invalid_input(format!("expected YYYY-MM, got '{}'", s)))?;

        let year = year
            .parse::<i32>()
            .map_err(|_| Error::invalid_input(format!("invalid year in '{}'", s)))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| Error::invalid_input(format!("invalid month in '{}'", s)))?;

        Self::new(year, month)
    }
}
