pub mod classify;
pub mod config;
pub mod error;
pub mod flow;
pub mod git;
pub mod remedy;
pub mod report;
pub mod update;
