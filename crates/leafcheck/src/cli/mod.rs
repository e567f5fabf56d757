//! Command implementations.

pub mod config;
pub mod diagnose;
pub mod interactive;
pub mod labels;
pub mod lookup;
pub mod model;
pub mod report;
