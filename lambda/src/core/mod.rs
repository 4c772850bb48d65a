//! Configuration and domain types shared by the relay and the upload notifier

pub mod config;
pub mod models;
