use crate::core::plan::{MappingPlan, PlanOutcome};
use crate::core::transform::LINE_ITEMS_OUTPUT_FIELD;
use crate::core::value::value_to_text;
use crate::domain::mapping::FieldRule;
use crate::domain::model::{Document, MappingRunResult, Rejection};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::transaction::{format_currency, StoredTransaction};
use crate::utils::error::{MapperError, Result};
use serde_json::Value;
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub const SUPPORTED: [&'static str; 2] = ["json", "csv"];
}

impl FromStr for ExportFormat {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(MapperError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: other.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    Self::SUPPORTED.join(", ")
                ),
            }),
        }
    }
}

/// 匯出 ZIP 的內容與檔名設定
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub name: String,
    pub formats: Vec<ExportFormat>,
    /// 支援 `{name}` 與 `{timestamp}`
    pub filename_pattern: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            name: "erp_mapping".to_string(),
            formats: vec![ExportFormat::Json, ExportFormat::Csv],
            filename_pattern: None,
        }
    }
}

impl ExportOptions {
    pub fn filename(&self) -> String {
        match &self.filename_pattern {
            Some(pattern) => pattern
                .replace("{name}", &self.name)
                .replace(
                    "{timestamp}",
                    &chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string(),
                ),
            None => format!("{}_output.zip", self.name),
        }
    }
}

/// 讀取交易檔、驗證後轉換、匯出 ZIP
pub struct MappingPipeline<S: Storage, C: ConfigProvider> {
    input: S,
    output: S,
    config: C,
    plan: MappingPlan,
    export: ExportOptions,
    search: Option<String>,
}

impl<S: Storage, C: ConfigProvider> MappingPipeline<S, C> {
    pub fn new(input: S, output: S, config: C, plan: MappingPlan, export: ExportOptions) -> Self {
        let strict = plan.strict_required || config.strict_required();
        let plan = plan.with_strict_required(strict);
        Self {
            input,
            output,
            config,
            plan,
            export,
            search: None,
        }
    }

    /// 只處理符合搜尋字串的資料列（只適用於資料表匯出的交易）
    pub fn with_search(mut self, term: Option<String>) -> Self {
        self.search = term.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn plan(&self) -> &MappingPlan {
        &self.plan
    }

    fn documents_from(&self, value: Value) -> Result<Vec<Document>> {
        let items = match value {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            other => {
                return Err(MapperError::ProcessingError {
                    message: format!(
                        "Expected a transaction object or array, found {}",
                        json_type(&other)
                    ),
                })
            }
        };

        let mut documents = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                tracing::warn!("⚠️ Skipping item {}: not a JSON object", index);
                continue;
            }
            if is_stored_row(&item) {
                if let Some(document) = self.document_from_row(index, item) {
                    documents.push(document);
                }
            } else if self.search.is_none() {
                documents.push(item);
            } else {
                tracing::debug!("item {} is not a stored row; search filter skips it", index);
            }
        }
        Ok(documents)
    }

    fn document_from_row(&self, index: usize, item: Value) -> Option<Document> {
        let row: StoredTransaction = match serde_json::from_value(item) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("⚠️ Skipping row {}: {}", index, e);
                return None;
            }
        };

        if let Some(term) = &self.search {
            if !row.matches_search(term) {
                return None;
            }
        }

        if let Ok(summary) = row.summary() {
            tracing::debug!(
                "📄 Transaction {} [{}] {:?} {} ({} lines)",
                summary.id,
                summary.integration_service,
                summary.status,
                format_currency(Some(summary.order_total), "$"),
                summary.line_count
            );
        }

        match row.document() {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::error!(
                    "❌ Transaction {} has a malformed JSON blob: {}",
                    row.transaction_id,
                    e
                );
                None
            }
        }
    }

    /// 每筆明細一列，`reference` 取自轉換前的交易，與 `rejected.json` 的標示一致
    fn line_item_csv(&self, accepted: &[(String, Document)]) -> Result<String> {
        let mut columns: Vec<&str> = Vec::new();
        for entry in &self.plan.line_items {
            if !columns.contains(&entry.target_field()) {
                columns.push(entry.target_field());
            }
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = vec!["reference"];
        header.extend(columns.iter().copied());
        writer.write_record(&header)?;

        for (reference, document) in accepted {
            let lines = document
                .get(LINE_ITEMS_OUTPUT_FIELD)
                .and_then(|lines| lines.as_array());

            for line in lines.into_iter().flatten() {
                let mut row = vec![reference.clone()];
                row.extend(columns.iter().map(|column| {
                    line.get(*column)
                        .and_then(value_to_text)
                        .unwrap_or_default()
                }));
                writer.write_record(&row)?;
            }
        }

        let bytes = writer.into_inner().map_err(|e| MapperError::ProcessingError {
            message: format!("Failed to finish CSV output: {}", e),
        })?;
        String::from_utf8(bytes).map_err(|e| MapperError::ProcessingError {
            message: format!("CSV output is not valid UTF-8: {}", e),
        })
    }
}

fn is_stored_row(item: &Value) -> bool {
    item.get("TransactionId").is_some() && item.get("JSON").map(Value::is_string).unwrap_or(false)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 交易的顯示參照：優先用 id，其次採購單號，最後用序號
fn reference_of(document: &Value, index: usize) -> String {
    ["id", "Reference ID", "purchaseOrderReference"]
        .iter()
        .filter_map(|key| document.get(*key))
        .find_map(value_to_text)
        .unwrap_or_else(|| format!("#{}", index + 1))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MappingPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Document>> {
        tracing::debug!("Reading transactions from: {}", self.config.input_path());
        let bytes = self.input.read_file(self.config.input_path()).await?;
        let value: Value = serde_json::from_slice(&bytes)?;

        let documents = self.documents_from(value)?;
        if documents.is_empty() {
            tracing::warn!("⚠️ No transaction documents found in {}", self.config.input_path());
        }
        Ok(documents)
    }

    async fn transform(&self, documents: Vec<Document>) -> Result<MappingRunResult> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for (index, document) in documents.iter().enumerate() {
            let reference = reference_of(document, index);
            match self.plan.apply(document) {
                PlanOutcome::Transformed(output) => {
                    tracing::debug!("✅ {} mapped", reference);
                    accepted.push((reference, output));
                }
                PlanOutcome::Rejected(errors) => {
                    for error in &errors {
                        tracing::warn!("🚫 {}: {}", reference, error);
                    }
                    rejected.push(Rejection { reference, errors });
                }
            }
        }

        let csv_output = self.line_item_csv(&accepted)?;

        Ok(MappingRunResult {
            accepted: accepted.into_iter().map(|(_, output)| output).collect(),
            rejected,
            csv_output,
        })
    }

    async fn load(&self, result: MappingRunResult) -> Result<String> {
        let filename = self.export.filename();
        let output_path = format!("{}/{}", self.config.output_path(), filename);

        tracing::debug!(
            "Creating ZIP file with {} accepted and {} rejected transactions",
            result.accepted.len(),
            result.rejected.len()
        );

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for format in &self.export.formats {
                match format {
                    ExportFormat::Json => {
                        zip.start_file::<_, ()>("transformed.json", FileOptions::default())?;
                        let json_data = serde_json::to_string_pretty(&result.accepted)?;
                        zip.write_all(json_data.as_bytes())?;
                    }
                    ExportFormat::Csv => {
                        zip.start_file::<_, ()>("line_items.csv", FileOptions::default())?;
                        zip.write_all(result.csv_output.as_bytes())?;
                    }
                }
            }

            // 驗證失敗的交易一併輸出，方便修正對照設定
            if !result.rejected.is_empty() {
                zip.start_file::<_, ()>("rejected.json", FileOptions::default())?;
                let json_data = serde_json::to_string_pretty(&result.rejected)?;
                zip.write_all(json_data.as_bytes())?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.output.write_file(&filename, &zip_data).await?;

        Ok(output_path)
    }
}
