// Frameworks: settings, database wiring and server startup.

pub mod config;
pub mod db;
pub mod server;
