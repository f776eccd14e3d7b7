//! CLI command handlers, one file per command.

mod config;
mod cookies;
mod extract;
mod health;
mod monitor;
mod session;
mod submit;

pub use config::run_config;
pub use cookies::run_cookies;
pub use extract::run_extract;
pub use health::run_health;
pub use monitor::run_monitor;
pub use submit::run_submit;
