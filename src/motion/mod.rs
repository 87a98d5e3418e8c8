//! Motion command subsystem

pub mod handoff;
pub mod mapper;
pub mod safety;

pub use handoff::CommandCell;
pub use mapper::VelocityMapper;
pub use safety::{SafetyViolation, check_interlock};
