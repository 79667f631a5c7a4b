pub mod apps;
pub mod config;
