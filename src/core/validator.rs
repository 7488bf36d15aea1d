use crate::core::transform::resolve_source;
use crate::core::value::value_to_text;
use crate::domain::mapping::{FieldRule, MappingEntry, MappingGroup};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

/// 回傳給使用者看的錯誤字串，每筆以目標欄位名稱開頭。
/// 預設只檢查設定了 email 驗證的項目，`strict` 另外檢查未選來源的必填欄位。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    enforce_required: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未選來源且沒有自訂值的必填欄位也回報錯誤
    pub fn strict() -> Self {
        Self {
            enforce_required: true,
        }
    }

    pub fn validate(&self, entries: &[MappingEntry], document: &Value) -> Vec<String> {
        entries
            .iter()
            .filter_map(|entry| self.check_entry(entry, document))
            .collect()
    }

    pub fn validate_groups(&self, groups: &[MappingGroup], document: &Value) -> Vec<String> {
        groups
            .iter()
            .flat_map(|group| self.validate(&group.entries, document))
            .collect()
    }

    fn check_entry(&self, entry: &MappingEntry, document: &Value) -> Option<String> {
        let field = &entry.target_field;

        if !entry.email_validation {
            let missing = self.enforce_required
                && entry.required
                && entry.source_field.is_unset()
                && !entry.has_literal_override();
            return missing.then(|| format!("{}: Required field has no source selected", field));
        }

        if entry.has_literal_override() {
            // 輸出的是原字串，前後空白也算格式錯誤
            return (!is_valid_email(&entry.literal_override))
                .then(|| format!("{}: Invalid email format in user defined value", field));
        }

        if entry.source_field.is_unset() {
            return Some(format!("{}: No source field selected", field));
        }

        let source = &entry.source_field;
        let Some(text) = resolve_source(source, document).as_ref().and_then(value_to_text) else {
            return Some(format!("{}: Source field \"{}\" has no value", field, source));
        };

        let text = text.trim();
        if text.is_empty() {
            Some(format!("{}: Source field \"{}\" is empty", field, source))
        } else if !is_valid_email(text) {
            Some(format!(
                "{}: Source field \"{}\" does not contain a valid email",
                field, source
            ))
        } else {
            None
        }
    }
}

/// 預設規則的驗證
pub fn validate(entries: &[MappingEntry], document: &Value) -> Vec<String> {
    Validator::new().validate(entries, document)
}
