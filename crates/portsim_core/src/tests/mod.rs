//! Scenario tests for the simulation engine
//!
//! Tests are organized by topic:
//! - `end_to_end` - Two-asset run from known moments
//! - `reproducibility` - Seeds, replay and thread-count independence
//! - `covariance_recovery` - Simulated log returns match the input covariance
//! - `single_asset` - One asset reduces to plain GBM
//! - `validation` - Weight and data errors surface before any simulation
//! - `regularization` - Collinear assets still simulate
//! - `return_sources` - Historical-mean vs probability-weighted drift
//! - `comparison` - Current vs candidate allocations


mod comparison;
mod return_sources;
