mod allocation;
mod error;
mod money;
mod summary;
mod types;

pub use allocation::{PERCENT_TOLERANCE, calculate, check_percentages};
pub use error::{AllocationError, InputField};
pub use money::{AmountParseError, format_money, parse_amount};
pub use summary::render_summary;
pub use types::{Allocation, AllocationInput, Percentages};
