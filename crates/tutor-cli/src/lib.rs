//! Terminal runner components for snippet tutorials.

pub mod check;
pub mod config;
pub mod logging;
pub mod session;
pub mod terminal;
