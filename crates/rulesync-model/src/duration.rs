//! Prometheus-style durations (`5m`, `1h30m`, `90s`, `250ms`)
//!
//! Rule group intervals and alert `for` clauses are written as a sequence of
//! `<number><unit>` terms, largest unit first. Two durations are equal when
//! they describe the same number of milliseconds, so `60s == 1m`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)y)?(?:(\d+)w)?(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?(?:(\d+)ms)?$")
        .expect("Invalid duration regex")
});

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: u64 = 7 * MS_PER_DAY;
const MS_PER_YEAR: u64 = 365 * MS_PER_DAY;

/// Unit multipliers in the order the capture groups appear in [`DURATION_RE`].
const UNITS: [u64; 7] = [
    MS_PER_YEAR,
    MS_PER_WEEK,
    MS_PER_DAY,
    MS_PER_HOUR,
    MS_PER_MINUTE,
    MS_PER_SECOND,
    1,
];

/// Errors produced when parsing a duration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration string")]
    Empty,

    #[error("not a valid duration string: {0:?}")]
    Invalid(String),

    #[error("duration out of range: {0:?}")]
    Overflow(String),
}

/// A non-negative duration with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromDuration(u64);

impl PromDuration {
    /// The zero duration. An omitted interval or `for` clause means zero.
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * MS_PER_SECOND)
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for PromDuration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DurationError::Empty);
        }
        if s == "0" {
            return Ok(Self::ZERO);
        }

        let caps = DURATION_RE
            .captures(s)
            .ok_or_else(|| DurationError::Invalid(s.to_string()))?;

        let mut total: u64 = 0;
        let mut matched_any = false;
        for (index, unit) in UNITS.iter().enumerate() {
            let Some(m) = caps.get(index + 1) else {
                continue;
            };
            matched_any = true;
            let value: u64 = m
                .as_str()
                .parse()
                .map_err(|_| DurationError::Overflow(s.to_string()))?;
            total = value
                .checked_mul(*unit)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| DurationError::Overflow(s.to_string()))?;
        }

        if !matched_any {
            return Err(DurationError::Invalid(s.to_string()));
        }

        Ok(Self(total))
    }
}

impl TryFrom<String> for PromDuration {
    type Error = DurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PromDuration> for String {
    fn from(value: PromDuration) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PromDuration {
    /// Canonical form: largest units first, weeks only when they divide
    /// the remainder exactly, `0s` for zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0s");
        }

        let mut rest = self.0;
        let mut emit = |f: &mut fmt::Formatter<'_>, unit: &str, size: u64, exact: bool| {
            if exact && rest % size != 0 {
                return Ok(());
            }
            let count = rest / size;
            if count > 0 {
                rest -= count * size;
                write!(f, "{}{}", count, unit)?;
            }
            Ok(())
        };

        emit(f, "y", MS_PER_YEAR, false)?;
        emit(f, "w", MS_PER_WEEK, true)?;
        emit(f, "d", MS_PER_DAY, false)?;
        emit(f, "h", MS_PER_HOUR, false)?;
        emit(f, "m", MS_PER_MINUTE, false)?;
        emit(f, "s", MS_PER_SECOND, false)?;
        emit(f, "ms", 1, false)
    }
}
