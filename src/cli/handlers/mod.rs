// src/cli/handlers/mod.rs

// One module per CLI action, plus the shared launch-resolution flow.

pub mod commons;
pub mod dev;
