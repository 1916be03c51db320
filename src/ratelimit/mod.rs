//! Rate limit policy parsing and lookup.

mod command;
mod method;
mod rate;
mod registry;
mod unit;

pub use command::PeriodCommand;
pub use method::{is_supported_method, HTTP_METHODS};
pub use rate::{parse_global_rate, parse_scoped_rate, GlobalRate, ScopedRate, TIME_FORMAT};
pub use registry::{RateRegistry, SharedRateRegistry, NO_LIMIT};
pub use unit::RateUnit;
