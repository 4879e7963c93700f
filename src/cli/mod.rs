pub mod commands;
pub mod display;
pub mod node;

pub use commands::{CliArgs, Commands};
