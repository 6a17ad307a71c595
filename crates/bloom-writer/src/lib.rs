pub mod cli;
pub mod format;
mod progress;
pub mod sink;
