pub mod app;
pub mod config;
pub mod content;
pub mod notify;
pub mod paths;
pub mod services;
pub mod update;
