pub mod categories;
pub mod config;
pub mod cutoffs;
pub mod output;
pub mod prediction;
pub mod recommend;
pub mod server;
