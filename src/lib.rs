//! WanderWise — a Sri Lanka travel-planning assistant.
//!
//! The binary (`src/main.rs`) wires these modules together; integration
//! tests drive the same pieces directly.

pub mod config;
pub mod error;
pub mod logger;
pub mod subsystems;
pub mod supervisor;
