//! Medilens - medical report analysis backend.
//!
//! Accepts an uploaded lab report, asks a vision language model to extract
//! and explain the results, and serves the normalized JSON. When the model
//! is unavailable or misbehaves, a sample report flagged `is_mock` is served
//! instead.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
