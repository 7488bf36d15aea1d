use serde::{Deserialize, Serialize};

/// 交易文件：任意巢狀 JSON，key 依插入順序保存
pub type Document = serde_json::Value;

/// 因對照驗證失敗而未轉換的交易
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub reference: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingRunResult {
    pub accepted: Vec<Document>,
    pub rejected: Vec<Rejection>,
    pub csv_output: String,
}
