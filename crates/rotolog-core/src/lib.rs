//! rotolog core - shared configuration, error handling and the clock seam

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;

pub use clock::{Clock, MockClock, SystemClock};
pub use config::*;
pub use error::{Error, Result};
