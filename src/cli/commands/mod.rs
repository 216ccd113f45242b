//! CLI command implementations

pub mod utils;

pub mod audit;
pub mod completions;
pub mod doc;
pub mod init;
pub mod review;
pub mod roster;
pub mod workflow;
