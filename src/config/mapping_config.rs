use crate::core::pipeline::{ExportFormat, ExportOptions};
use crate::core::plan::MappingPlan;
use crate::domain::defaults::{default_line_item_mapping, default_mapping_groups};
use crate::domain::mapping::{FieldRule, LineItemMappingEntry, MappingGroup};
use crate::utils::error::{MapperError, Result};
use crate::utils::validation::{
    validate_allowed_values, validate_non_empty_string, validate_path, validate_unique, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

/// TOML 對照設定檔；`groups` 或 `line_items` 省略時使用內建預設
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub mapping: MappingInfo,
    pub validation: Option<ValidationConfig>,
    pub groups: Option<Vec<MappingGroup>>,
    pub line_items: Option<Vec<LineItemMappingEntry>>,
    pub load: Option<LoadConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub strict_required: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
    pub filename_pattern: Option<String>, // 例如: "{name}_{timestamp}.zip"
}

impl MappingConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapperError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MapperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ERP_BRANCH})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn strict_required(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|v| v.strict_required)
            .unwrap_or(false)
    }

    pub fn output_path(&self) -> Option<&str> {
        self.load.as_ref().and_then(|l| l.output_path.as_deref())
    }

    pub fn plan(&self) -> MappingPlan {
        let groups = self.groups.clone().unwrap_or_else(default_mapping_groups);
        let line_items = self.line_items.clone().unwrap_or_else(default_line_item_mapping);
        MappingPlan::new(groups, line_items).with_strict_required(self.strict_required())
    }

    pub fn export_options(&self) -> Result<ExportOptions> {
        let defaults = ExportOptions::default();
        let load = self.load.as_ref();

        let formats = match load.and_then(|l| l.output_formats.as_ref()) {
            Some(formats) => formats
                .iter()
                .map(|f| f.parse::<ExportFormat>())
                .collect::<Result<Vec<_>>>()?,
            None => defaults.formats,
        };

        Ok(ExportOptions {
            name: self.mapping.name.clone(),
            formats,
            filename_pattern: load.and_then(|l| l.filename_pattern.clone()),
        })
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("mapping.name", &self.mapping.name)?;

        // 明確寫出空的 groups 等於沒有任何對照
        if self.groups.as_ref().is_some_and(Vec::is_empty) {
            return Err(MapperError::MissingConfigError {
                field: "groups".to_string(),
            });
        }

        for (index, group) in self.groups.iter().flatten().enumerate() {
            validate_non_empty_string(&format!("groups[{}].name", index), &group.name)?;
            let field = format!("groups.{}", group.name);
            validate_unique(&field, group.entries.iter().map(|e| e.target_field.as_str()))?;
            check_rules(&field, &group.entries)?;
        }

        if let Some(line_items) = &self.line_items {
            validate_unique("line_items", line_items.iter().map(|e| e.target_field.as_str()))?;
            check_rules("line_items", line_items)?;
        }

        if let Some(load) = &self.load {
            if let Some(output_path) = &load.output_path {
                validate_path("load.output_path", output_path)?;
            }
            if let Some(formats) = &load.output_formats {
                if formats.is_empty() {
                    return Err(MapperError::InvalidConfigValueError {
                        field: "load.output_formats".to_string(),
                        value: "[]".to_string(),
                        reason: "At least one output format is required".to_string(),
                    });
                }
                validate_allowed_values("load.output_formats", formats, &ExportFormat::SUPPORTED)?;
            }
            if let Some(pattern) = &load.filename_pattern {
                validate_non_empty_string("load.filename_pattern", pattern)?;
            }
        }

        Ok(())
    }
}

fn check_rules<R: FieldRule>(field: &str, rules: &[R]) -> Result<()> {
    for rule in rules {
        validate_non_empty_string(&format!("{}.target_field", field), rule.target_field())?;
        if rule.has_literal_override() && !rule.operations().is_empty() {
            return Err(MapperError::ConfigValidationError {
                field: format!("{}.{}", field, rule.target_field()),
                message: "sanitize_operations must be empty when literal_override is set".to_string(),
            });
        }
    }
    Ok(())
}

impl Validate for MappingConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
