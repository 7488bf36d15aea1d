use crate::core::transform::transform;
use crate::core::validator::Validator;
use crate::domain::defaults::{default_line_item_mapping, default_mapping_groups};
use crate::domain::mapping::{LineItemMappingEntry, MappingCoverage, MappingGroup};
use crate::domain::model::Document;
use serde::{Deserialize, Serialize};

/// 一次對照流程所需的全部設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingPlan {
    pub groups: Vec<MappingGroup>,
    #[serde(default)]
    pub line_items: Vec<LineItemMappingEntry>,
    #[serde(default)]
    pub strict_required: bool,
}

/// 驗證不通過時的結果
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Transformed(Document),
    Rejected(Vec<String>),
}

impl MappingPlan {
    pub fn new(groups: Vec<MappingGroup>, line_items: Vec<LineItemMappingEntry>) -> Self {
        Self {
            groups,
            line_items,
            strict_required: false,
        }
    }

    pub fn defaults() -> Self {
        Self::new(default_mapping_groups(), default_line_item_mapping())
    }

    pub fn with_strict_required(mut self, strict: bool) -> Self {
        self.strict_required = strict;
        self
    }

    fn validator(&self) -> Validator {
        if self.strict_required {
            Validator::strict()
        } else {
            Validator::new()
        }
    }

    pub fn validate(&self, document: &Document) -> Vec<String> {
        self.validator().validate_groups(&self.groups, document)
    }

    pub fn transform(&self, document: &Document) -> Document {
        transform(document, &self.groups, &self.line_items)
    }

    /// 先驗證，有錯誤就不轉換
    pub fn apply(&self, document: &Document) -> PlanOutcome {
        let errors = self.validate(document);
        if errors.is_empty() {
            PlanOutcome::Transformed(self.transform(document))
        } else {
            PlanOutcome::Rejected(errors)
        }
    }

    pub fn coverage(&self) -> MappingCoverage {
        let header = MappingCoverage::of(self.groups.iter().flat_map(|g| g.entries.iter()));
        let lines = MappingCoverage::of(&self.line_items);
        MappingCoverage {
            mapped: header.mapped + lines.mapped,
            required: header.required + lines.required,
        }
    }
}

impl Default for MappingPlan {
    fn default() -> Self {
        Self::defaults()
    }
}
