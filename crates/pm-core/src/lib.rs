//! pm-core: shared foundation for phasemap.
//!
//! Contains:
//! - units (uom SI types + constructors, SI aliases for specific properties)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
