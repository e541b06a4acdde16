//! CLI command implementations.

pub mod frameworks;
pub mod generate;
pub mod init;
pub mod serve;
