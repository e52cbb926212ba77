//! Background tasks.

pub mod driver;

pub use driver::run_bridge_driver;
