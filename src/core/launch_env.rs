// src/core/launch_env.rs

use crate::constants::NODE_OPTIONS_VAR;
use log::debug;
use std::collections::HashMap;

/// The mutable environment being assembled for the child process.
///
/// Seeded from the parent's environment so the child inherits a complete
/// picture, then mutated only through the accessors below. The composed
/// options variable (`NODE_OPTIONS`) is append-only: a value the user set
/// before invoking us survives, and options are only ever added to it.
#[derive(Debug, Clone, Default)]
pub struct LaunchEnv {
    vars: HashMap<String, String>,
}

impl LaunchEnv {
    /// An empty accumulator, for callers that assemble everything explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Appends one interpreter option to the composed options variable.
    ///
    /// An option that is already a substring of the current value is skipped,
    /// so repeated injection passes cannot stack duplicates. Returns whether
    /// the option was actually appended.
    pub fn append_node_option(&mut self, option: &str) -> bool {
        let current = self.get(NODE_OPTIONS_VAR).unwrap_or("");
        if current.contains(option) {
            debug!("Skipping duplicate node option: {}", option);
            return false;
        }
        let merged = if current.is_empty() {
            option.to_string()
        } else {
            format!("{} {}", current, option)
        };
        self.vars.insert(NODE_OPTIONS_VAR.to_string(), merged);
        true
    }

    /// The composed options value, if any option is set.
    pub fn node_options(&self) -> Option<&str> {
        self.get(NODE_OPTIONS_VAR)
    }

    /// Consumes the accumulator, yielding the final variable map.
    pub fn into_map(self) -> HashMap<String, String> {
        self.vars
    }
}
