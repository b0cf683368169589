pub mod auth;
pub mod entries;
pub mod games;
pub mod health;
pub mod leaderboard;
pub mod players;
pub mod routes;
pub mod subscribers;
