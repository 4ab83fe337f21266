// Data layer for the job board: SQL fragment builders, models and repositories

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod sql;
pub mod telemetry;
