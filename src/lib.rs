pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::assumptions::ModelConfig;
pub use core::engine::{InvestmentModel, InvestmentReport, InvestmentSummary};
pub use utils::error::{ModelError, Result};
