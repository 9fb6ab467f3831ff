//! # System Interaction Layer
//!
//! This module is the boundary between launch resolution and the operating
//! system: everything that spawns, signals, or waits on real processes
//! lives here.
//!
//! ## Modules
//!
//! - **`launcher`**: Spawns Node.js children from an argv list (never a
//!   shell), wires up stdio inheritance, and reports the child's fate as a
//!   typed error.
//! - **`guardian`**: The process-wide child registry. It installs a one-time
//!   signal hook and forwards the received shutdown signal to every live
//!   child, so an interactive Ctrl+C tears the whole tree down together.

pub mod guardian;
pub mod launcher;
