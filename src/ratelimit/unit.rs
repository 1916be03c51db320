//! Time units accepted in period commands.

use std::time::Duration;

/// Unit of a period command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateUnit {
    /// `S`, one second
    Second,
    /// `M`, sixty seconds
    Minute,
    /// `H`, one hour
    Hour,
    /// `D`, one day
    Day,
}

impl RateUnit {
    /// All recognized unit codes.
    pub const CODES: [&'static str; 4] = ["S", "M", "H", "D"];

    /// Resolve a unit code, ignoring case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "S" => Some(RateUnit::Second),
            "M" => Some(RateUnit::Minute),
            "H" => Some(RateUnit::Hour),
            "D" => Some(RateUnit::Day),
            _ => None,
        }
    }

    /// The canonical (uppercase) code of this unit.
    pub fn code(&self) -> &'static str {
        match self {
            RateUnit::Second => "S",
            RateUnit::Minute => "M",
            RateUnit::Hour => "H",
            RateUnit::Day => "D",
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(&self) -> u64 {
        match self {
            RateUnit::Second => 1,
            RateUnit::Minute => 60,
            RateUnit::Hour => 3600,
            RateUnit::Day => 86400,
        }
    }

    /// Get the duration of one unit.
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds())
    }
}
