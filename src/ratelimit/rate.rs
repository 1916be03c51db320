//! Global and scoped rate records.
//!
//! Both kinds are built only through their `parse` constructors, so a rate
//! that exists has already passed validation. The deadline is the only field
//! that changes afterwards.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::command::{parse_with_limit, PeriodCommand};
use super::method::is_supported_method;
use crate::error::{LimiterError, Result};

/// Display format for deadlines, `YYYY-MM-DD HH:MM:SS`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The part shared by global and scoped rates.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Window {
    command: PeriodCommand,
    limit: u64,
    /// Epoch seconds, zero until first set
    deadline: i64,
}

impl Window {
    fn new(command: PeriodCommand, limit: u64) -> Self {
        Self {
            command,
            limit,
            deadline: 0,
        }
    }

    fn update_deadline_at(&mut self, now: DateTime<Utc>) {
        let period = i64::try_from(self.command.period().as_secs()).unwrap_or(i64::MAX);
        self.deadline = now.timestamp().saturating_add(period);
    }

    fn set_deadline(&mut self, deadline: i64) {
        if deadline > 0 {
            self.deadline = deadline;
        }
    }

    fn deadline_display(&self) -> Option<String> {
        if self.deadline == 0 {
            return None;
        }
        DateTime::<Utc>::from_timestamp(self.deadline, 0)
            .map(|at| at.format(TIME_FORMAT).to_string())
    }
}

/// A limit applied per client across every endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRate {
    window: Window,
}

impl GlobalRate {
    /// Parse a global rate such as `GlobalRate::parse("10-M", 200)`:
    /// each client may make 200 requests every ten minutes.
    pub fn parse(command: &str, limit: i64) -> Result<Self> {
        let (command, limit) = parse_with_limit(command, limit)?;
        debug!(command = %command, limit = limit, "Parsed global rate");
        Ok(Self {
            window: Window::new(command, limit),
        })
    }

    /// The period command as supplied.
    pub fn command(&self) -> &str {
        self.window.command.as_str()
    }

    pub fn period(&self) -> Duration {
        self.window.command.period()
    }

    /// Maximum requests allowed within one period.
    pub fn limit(&self) -> u64 {
        self.window.limit
    }

    /// End of the current window in epoch seconds, or 0 if never set.
    pub fn deadline(&self) -> i64 {
        self.window.deadline
    }

    /// Start a new window ending one period from now.
    pub fn update_deadline(&mut self) {
        self.update_deadline_at(Utc::now());
    }

    /// Start a new window ending one period after `now`.
    pub fn update_deadline_at(&mut self, now: DateTime<Utc>) {
        self.window.update_deadline_at(now);
    }

    /// Overwrite the deadline. Non-positive values are ignored.
    pub fn set_deadline(&mut self, deadline: i64) {
        self.window.set_deadline(deadline);
    }

    /// The deadline in [`TIME_FORMAT`] (UTC), or `None` while unset.
    pub fn deadline_display(&self) -> Option<String> {
        self.window.deadline_display()
    }
}

impl fmt::Display for GlobalRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requests per {}", self.limit(), self.command())
    }
}

/// A limit applied to one path and HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRate {
    path: String,
    method: String,
    window: Window,
}

impl ScopedRate {
    /// Parse a rate bound to `path` and `method`.
    ///
    /// The command and limit are validated exactly as for [`GlobalRate::parse`];
    /// the method is checked last. The path is taken as-is and the method keeps
    /// its original casing.
    pub fn parse(path: &str, command: &str, method: &str, limit: i64) -> Result<Self> {
        let (command, limit) = parse_with_limit(command, limit)?;

        if !is_supported_method(method) {
            return Err(LimiterError::Method {
                method: method.to_string(),
            });
        }

        debug!(
            path = path,
            method = method,
            command = %command,
            limit = limit,
            "Parsed scoped rate"
        );

        Ok(Self {
            path: path.to_string(),
            method: method.to_string(),
            window: Window::new(command, limit),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The period command as supplied.
    pub fn command(&self) -> &str {
        self.window.command.as_str()
    }

    pub fn period(&self) -> Duration {
        self.window.command.period()
    }

    /// Maximum requests allowed within one period.
    pub fn limit(&self) -> u64 {
        self.window.limit
    }

    /// End of the current window in epoch seconds, or 0 if never set.
    pub fn deadline(&self) -> i64 {
        self.window.deadline
    }

    /// Exact, case-sensitive match on both path and method.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        self.path == path && self.method == method
    }

    /// Start a new window ending one period from now.
    pub fn update_deadline(&mut self) {
        self.update_deadline_at(Utc::now());
    }

    /// Start a new window ending one period after `now`.
    pub fn update_deadline_at(&mut self, now: DateTime<Utc>) {
        self.window.update_deadline_at(now);
    }

    /// Overwrite the deadline. Non-positive values are ignored.
    pub fn set_deadline(&mut self, deadline: i64) {
        self.window.set_deadline(deadline);
    }

    /// The deadline in [`TIME_FORMAT`] (UTC), or `None` while unset.
    pub fn deadline_display(&self) -> Option<String> {
        self.window.deadline_display()
    }
}

impl fmt::Display for ScopedRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} requests per {}",
            self.method,
            self.path,
            self.limit(),
            self.command()
        )
    }
}

/// Parse a global rate. See [`GlobalRate::parse`].
pub fn parse_global_rate(command: &str, limit: i64) -> Result<GlobalRate> {
    GlobalRate::parse(command, limit)
}

/// Parse a scoped rate. See [`ScopedRate::parse`].
pub fn parse_scoped_rate(
    path: &str,
    command: &str,
    method: &str,
    limit: i64,
) -> Result<ScopedRate> {
    ScopedRate::parse(path, command, method, limit)
}
