pub mod reservation_log;

pub use reservation_log::*;
