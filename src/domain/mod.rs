pub mod availability;
pub mod booking;
pub mod date_range;
pub mod error;
pub mod pricing;
pub mod selection;

pub use availability::*;
pub use booking::*;
pub use date_range::*;
pub use error::*;
pub use pricing::*;
pub use selection::*;
