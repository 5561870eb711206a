pub mod config;

pub use config::{init_logging, log_route_table, LoggingConfig};
