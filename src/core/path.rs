use serde_json::{Map, Value};

/// 交易文件上的訂單明細陣列
pub const LINE_ITEMS_FIELD: &str = "orderLines";

/// 依 `a.b.c` 逐層取值；數字 key 可索引陣列。
/// 任何一層不是容器或不存在就回傳 `None`。
pub fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => array_index(key).and_then(|index| items.get(index)),
        _ => None,
    })
}

/// 只接受標準十進位寫法（`0`、`12`），`01`、`+1` 都不算索引
fn array_index(key: &str) -> Option<usize> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

/// 列出文件中可選擇的葉節點路徑，順序與 key 插入順序一致
pub fn enumerate_paths(document: &Value) -> Vec<String> {
    enumerate_paths_with(document, LINE_ITEMS_FIELD)
}

/// 同 [`enumerate_paths`]，但可指定明細陣列欄位。
/// 明細陣列只看第一個元素的 key，輸出位置與陣列 key 本身相同。
pub fn enumerate_paths_with(document: &Value, array_field: &str) -> Vec<String> {
    let mut paths = Vec::new();
    if let Value::Object(map) = document {
        walk(map, "", Some(array_field), &mut paths);
    }
    paths
}

fn walk(map: &Map<String, Value>, prefix: &str, array_field: Option<&str>, out: &mut Vec<String>) {
    for (key, value) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(child) => walk(child, &full, None, out),
            Value::Array(items) if array_field == Some(key.as_str()) => {
                if let Some(Value::Object(first)) = items.first() {
                    out.extend(first.keys().map(|item_key| format!("{}.{}", full, item_key)));
                }
            }
            _ => out.push(full),
        }
    }
}

/// 第一筆明細的 key，作為明細對照可選的來源
pub fn line_item_keys(document: &Value) -> Vec<String> {
    document
        .get(LINE_ITEMS_FIELD)
        .and_then(|lines| lines.as_array())
        .and_then(|lines| lines.first())
        .and_then(|first| first.as_object())
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default()
}
