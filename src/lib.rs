pub mod allocation;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod parser;
pub mod report;
pub mod service;
pub mod state;
pub mod web;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
