// src/core/mod.rs

pub mod launch_env;
pub mod loader;
pub mod modes;
pub mod module_resolver;
pub mod package;
pub mod paths;
