//! Demo prediction API backed by the simulator

pub mod api;
pub mod config;
pub mod error;
