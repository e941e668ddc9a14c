//! HTTP request handlers for the web server.

mod analyze;
mod health;

pub use analyze::analyze_report;
pub use health::{health, root};
