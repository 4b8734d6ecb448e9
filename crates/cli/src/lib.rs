//! The `deploy-notify` run: configuration, deployed-commit discovery, and
//! pipeline orchestration on top of the `scm` and `notify` crates.

pub mod config;
pub mod pipeline;
pub mod status;

pub use config::Config;
pub use pipeline::run;
