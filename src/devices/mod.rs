//! Base controller implementations

pub mod mock;
pub mod serial;

pub use mock::MockBase;
pub use serial::SerialBase;
