//! Poker league server: players, games, chip entries and a derived
//! leaderboard behind a JSON API.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod league;
pub mod metrics;
