//! Command implementations

pub mod update;
pub mod version;
