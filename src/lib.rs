//! Onboarding wizard: a multi-step form engine that accumulates a client
//! record across steps and gates each step on local validation.

pub mod config;
pub mod console;
pub mod effects;
pub mod error;
pub mod steps;
pub mod task;
pub mod telemetry;
pub mod wizard;
