//! InsuCalc library: application logic for the premium matrix CLI.

pub mod app;
pub mod config;
pub mod errors;
pub mod version;
