pub mod cli;
pub mod mapping_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "erp-mapper")]
#[command(about = "Validate and map transaction JSON onto an ERP order schema")]
pub struct CliConfig {
    #[arg(long, short, help = "Transaction JSON file (document, array of documents, or exported rows)")]
    pub input: String,

    #[arg(long, short, help = "TOML mapping configuration; built-in defaults when omitted")]
    pub mapping_config: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', help = "Override load.output_formats (json,csv)")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Only process exported rows matching this integration or reference")]
    pub search: Option<String>,

    #[arg(long, help = "Report required fields without a source as validation errors")]
    pub strict_required: bool,

    #[arg(long, help = "Exit with an error when any transaction is rejected")]
    pub fail_on_rejections: bool,

    #[arg(long, help = "Print the selectable source paths of the first transaction and exit")]
    pub list_paths: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn strict_required(&self) -> bool {
        self.strict_required
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::validation::{validate_allowed_values, validate_path};

        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        if let Some(mapping_config) = &self.mapping_config {
            validate_path("mapping_config", mapping_config)?;
        }
        validate_allowed_values(
            "output_formats",
            &self.output_formats,
            &crate::core::pipeline::ExportFormat::SUPPORTED,
        )
    }
}
