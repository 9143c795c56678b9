//! Canopy CLI
//!
//! Configuration loading and the command implementations behind the
//! `canopy` binary. Every playlist mutation runs in an edit session and is
//! committed before the command returns.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod config;

pub use config::CanopyConfig;
