//! CLI subcommand implementations.

pub mod gesture;
pub mod plan;
pub mod run;
pub mod session;
pub mod status;
pub mod tasks;
pub mod traces;
pub mod util;
