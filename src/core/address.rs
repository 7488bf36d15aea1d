use crate::core::value::value_to_text;
use crate::domain::mapping::AddressKind;
use serde_json::Value;

/// 把地址子物件的固定欄位以 `", "` 串接，略過空白欄位；子物件不存在時回傳空字串
pub fn concatenate(kind: AddressKind, document: &Value) -> String {
    let Some(container) = document.get(kind.container_key()).filter(|v| v.is_object()) else {
        return String::new();
    };

    kind.part_keys()
        .iter()
        .filter_map(|key| container.get(*key))
        .filter(|part| part.is_string() || part.is_number())
        .filter_map(value_to_text)
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
