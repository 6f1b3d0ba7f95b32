//! Subsystem modules for WanderWise.

pub mod chat;
pub mod comms;
pub mod events;
pub mod management;
pub mod planner;
pub mod runtime;
