pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, mapping_config::MappingConfig};
pub use core::{etl::EtlEngine, pipeline::MappingPipeline, plan::MappingPlan};
pub use utils::error::{MapperError, Result};
