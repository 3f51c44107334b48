pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod runner;
pub mod types;
