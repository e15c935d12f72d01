pub mod cli;
pub mod load_config;
pub mod platforms;
pub mod providers;
pub mod schedule;

pub use cli::{run, Cli, Commands};
