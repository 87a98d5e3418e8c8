//! Device driver traits

pub mod base;

pub use base::BaseDriver;
