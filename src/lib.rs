//! Rotor: Constrained Random Map Rotation Generator
//!
//! Selects a randomized, rule-constrained sequence of map layers from a
//! candidate catalog, following a configured pattern of per-slot filters,
//! and writes the resulting rotation for game servers to consume.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod generate;
pub mod logging;
pub mod notify;
pub mod output;
pub mod plan;
pub mod policy;
