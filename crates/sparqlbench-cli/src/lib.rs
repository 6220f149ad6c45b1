//! sparqlbench CLI library
//!
//! Drives the query translator over whole workload files and benchmarks the
//! resulting batches on each engine:
//!
//! - `batch`: query files and per-dialect batches with their skip sets
//! - `runner`: process and HTTP runners plus the engine output parsers
//! - `report`: the per-query timing table and count disagreements

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
