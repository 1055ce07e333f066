//! Configuration file parsing

pub mod project;

pub use project::{load_dev_config, parse_dev_config, DevConfig};
