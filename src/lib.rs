// Core infrastructure modules
pub mod core;

// Configuration loading
pub mod config;
