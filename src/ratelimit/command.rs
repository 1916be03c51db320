//! Period command parsing.
//!
//! A period command has the form `<count>-<unit>`, e.g. `10-M` for ten
//! minutes. Validation runs in a fixed order so a malformed input always
//! surfaces the same error: separator count, numeric count, positive count,
//! request limit, then unit code.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use super::unit::RateUnit;
use crate::error::{LimiterError, Result};

/// A validated `<count>-<unit>` period command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCommand {
    raw: String,
    count: u64,
    unit: RateUnit,
    period: Duration,
}

impl PeriodCommand {
    /// Parse a period command on its own, without a request limit.
    pub fn parse(command: &str) -> Result<Self> {
        parse_command(command, None)
    }

    /// The command exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The numeric part of the command.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn unit(&self) -> RateUnit {
        self.unit
    }

    /// `count` units expressed as a duration.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl FromStr for PeriodCommand {
    type Err = LimiterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PeriodCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Validate a command together with its request limit.
///
/// The limit is checked after the count but before the unit, which decides
/// which error wins for inputs that are wrong in more than one way.
pub(crate) fn parse_with_limit(command: &str, limit: i64) -> Result<(PeriodCommand, u64)> {
    let parsed = parse_command(command, Some(limit))?;
    // parse_command already rejected non-positive limits
    Ok((parsed, limit as u64))
}

fn parse_command(command: &str, limit: Option<i64>) -> Result<PeriodCommand> {
    let format_error = || LimiterError::Format {
        command: command.to_string(),
    };

    let parts: Vec<&str> = command.split('-').collect();
    if parts.len() != 2 {
        warn!(
            command = command,
            parts = parts.len(),
            "Period command must have exactly one separator"
        );
        return Err(format_error());
    }

    let count: i64 = parts[0].parse().map_err(|_| format_error())?;
    if count <= 0 {
        return Err(LimiterError::Command {
            command: command.to_string(),
        });
    }

    if let Some(limit) = limit {
        if limit <= 0 {
            return Err(LimiterError::Limit { limit });
        }
    }

    let unit = RateUnit::from_code(parts[1]).ok_or_else(format_error)?;
    let count = count as u64;
    let seconds = count
        .checked_mul(unit.seconds())
        .ok_or_else(|| LimiterError::Command {
            command: command.to_string(),
        })?;

    Ok(PeriodCommand {
        raw: command.to_string(),
        count,
        unit,
        period: Duration::from_secs(seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_unit() {
        for (code, secs) in [("S", 1), ("M", 60), ("H", 3600), ("D", 86400)] {
            for n in [1u64, 7, 250] {
                let command = format!("{}-{}", n, code);
                let parsed = PeriodCommand::parse(&command).unwrap();
                assert_eq!(parsed.count(), n);
                assert_eq!(parsed.period(), Duration::from_secs(n * secs));
                assert_eq!(parsed.as_str(), command);
            }
        }
    }

    #[test]
    fn test_unit_is_case_insensitive() {
        let lower: PeriodCommand = "5-m".parse().unwrap();
        let upper: PeriodCommand = "5-M".parse().unwrap();
        assert_eq!(lower.period(), upper.period());
        assert_eq!(lower.unit(), RateUnit::Minute);
        // the raw text is preserved for display
        assert_eq!(lower.to_string(), "5-m");
    }

    #[test]
    fn test_separator_count() {
        for command in ["5M", "5-M-1", "", "-5-M", "5--M"] {
            let err = PeriodCommand::parse(command).unwrap_err();
            assert!(matches!(err, LimiterError::Format { .. }), "{command}");
        }
    }

    #[test]
    fn test_non_numeric_count() {
        for command in ["abc-M", "-M", " 5-M", "5.0-M"] {
            let err = PeriodCommand::parse(command).unwrap_err();
            assert!(matches!(err, LimiterError::Format { .. }), "{command}");
        }
    }

    #[test]
    fn test_non_positive_count() {
        let err = PeriodCommand::parse("0-M").unwrap_err();
        assert!(matches!(err, LimiterError::Command { .. }));
    }

    #[test]
    fn test_unknown_unit() {
        for command in ["5-X", "5-", "5-min"] {
            let err = PeriodCommand::parse(command).unwrap_err();
            assert!(matches!(err, LimiterError::Format { .. }), "{command}");
        }
    }

    #[test]
    fn test_period_overflow() {
        let command = format!("{}-D", i64::MAX);
        let err = PeriodCommand::parse(&command).unwrap_err();
        assert!(matches!(err, LimiterError::Command { .. }));
    }

    #[test]
    fn test_limit_checked_after_count() {
        // zero count wins over a bad limit
        let err = parse_with_limit("0-M", 0).unwrap_err();
        assert!(matches!(err, LimiterError::Command { .. }));

        // a bad limit wins over an unknown unit
        let err = parse_with_limit("5-X", 0).unwrap_err();
        assert!(matches!(err, LimiterError::Limit { limit: 0 }));

        let err = parse_with_limit("5-X", 3).unwrap_err();
        assert!(matches!(err, LimiterError::Format { .. }));
    }

    #[test]
    fn test_parse_with_limit() {
        let (command, limit) = parse_with_limit("10-m", 200).unwrap();
        assert_eq!(limit, 200);
        assert_eq!(command.period(), Duration::from_secs(600));
    }
}
