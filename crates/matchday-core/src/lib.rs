// Library root: the league state engine, standings, persistence and config.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod league;
pub mod standings;
pub mod store;
