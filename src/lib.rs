// Library exports for Dertlio
// This allows integration tests and external code to use Dertlio modules

pub mod auth;
pub mod company;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod extractors;
pub mod routes;
pub mod state;
