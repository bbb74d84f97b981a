//! JPL Horizons access
//!
//! - `query`: request parameters and value quoting
//! - `client`: the [`EphemerisSource`] trait and its blocking HTTP implementation
//! - `parser`: vector-table parsing into [`ParsedEphemeris`]

pub mod client;
pub mod parser;
pub mod query;

pub use self::client::{EphemerisSource, HorizonsClient, DEFAULT_TIMEOUT, HORIZONS_URL};
pub use self::parser::{parse, ParsedEphemeris};
pub use self::query::{quote_value, EphemerisQuery};
