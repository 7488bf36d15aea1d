use crate::core::address::concatenate;
use crate::core::path::{resolve, LINE_ITEMS_FIELD};
use crate::core::sanitize::sanitize;
use crate::domain::mapping::{FieldRule, LineItemMappingEntry, LineItemSource, MappingGroup, SourceField};
use serde_json::{Map, Value};

/// 輸出文件中的明細陣列欄位
pub const LINE_ITEMS_OUTPUT_FIELD: &str = "LineItems";

/// 取得來源值：虛擬地址動態組合，其餘依路徑解析
pub fn resolve_source(source: &SourceField, document: &Value) -> Option<Value> {
    match source {
        SourceField::Unset => None,
        SourceField::Address(kind) => Some(Value::String(concatenate(*kind, document))),
        SourceField::Path(path) => resolve(document, path).cloned(),
    }
}

/// 自訂值優先；啟用清理時走清理管線，否則使用原值
fn mapped_value<R: FieldRule>(rule: &R, resolved: Option<&Value>) -> Option<Value> {
    if rule.has_literal_override() {
        return Some(Value::String(rule.literal_override().to_string()));
    }
    if rule.sanitize_enabled() {
        sanitize(resolved, rule.operations().as_slice(), "")
    } else {
        resolved.cloned()
    }
}

/// 依對照設定產生 ERP 格式的輸出文件，不修改輸入。
///
/// 群組依宣告順序處理，相同目標欄位以後者為準。
/// 沒有來源也沒有自訂值的項目略過；解析不到值的欄位不會出現在輸出中。
/// 文件沒有明細（或明細為空陣列）時輸出不含 `LineItems`。
pub fn transform(document: &Value, groups: &[MappingGroup], line_items: &[LineItemMappingEntry]) -> Value {
    let mut output = Map::new();

    for entry in groups.iter().flat_map(|group| group.entries.iter()) {
        if entry.source_field.is_unset() && !entry.has_literal_override() {
            tracing::trace!("skipping '{}': no source selected", entry.target_field);
            continue;
        }

        let resolved = resolve_source(&entry.source_field, document);
        match mapped_value(entry, resolved.as_ref()) {
            Some(value) => {
                output.insert(entry.target_field.clone(), value);
            }
            None => tracing::trace!(
                "'{}' has no value at '{}'",
                entry.target_field,
                entry.source_field
            ),
        }
    }

    let lines = document
        .get(LINE_ITEMS_FIELD)
        .and_then(|lines| lines.as_array())
        .filter(|lines| !lines.is_empty());

    if let Some(lines) = lines {
        let mapped: Vec<Value> = lines
            .iter()
            .map(|item| Value::Object(transform_line_item(item, line_items)))
            .collect();
        tracing::debug!("mapped {} line items", mapped.len());
        output.insert(LINE_ITEMS_OUTPUT_FIELD.to_string(), Value::Array(mapped));
    }

    Value::Object(output)
}

/// 單筆明細只做單層 key 查找
pub fn transform_line_item(item: &Value, mapping: &[LineItemMappingEntry]) -> Map<String, Value> {
    let mut record = Map::new();

    for entry in mapping {
        let resolved = match &entry.source_field {
            LineItemSource::Unset if !entry.has_literal_override() => continue,
            LineItemSource::Unset => None,
            LineItemSource::Key(key) => item.as_object().and_then(|fields| fields.get(key)),
        };

        if let Some(value) = mapped_value(entry, resolved) {
            record.insert(entry.target_field.clone(), value);
        }
    }

    record
}
