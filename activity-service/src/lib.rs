pub mod config;
pub mod handlers;
pub mod host;
pub mod models;
pub mod services;
pub mod startup;
