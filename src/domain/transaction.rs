use crate::domain::model::Document;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 資料表中的一筆交易，`json` 欄位是原始的交易 JSON 字串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    #[serde(rename = "TransactionId")]
    pub transaction_id: i64,
    #[serde(rename = "Integration")]
    pub integration: String,
    pub reference_key: String,
    pub reference_value: String,
    #[serde(default)]
    pub blob_path: String,
    pub created_on: DateTime<Utc>,
    #[serde(rename = "JSON")]
    pub json: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// 依付款回應文字判斷狀態
    pub fn from_document(document: &Document) -> Self {
        let response = document
            .get("cardDetails")
            .and_then(|card| card.get("responseText"))
            .and_then(|text| text.as_str());

        match response {
            Some("Approved") => TransactionStatus::Completed,
            Some("Processing") => TransactionStatus::Processing,
            Some("Failed") => TransactionStatus::Failed,
            _ => TransactionStatus::Pending,
        }
    }
}

/// 列表畫面與匯出用的交易摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub id: String,
    pub integration_service: String,
    pub reference_key: String,
    pub reference_value: String,
    pub purchase_order_reference: Option<String>,
    pub status: TransactionStatus,
    pub created_on: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub order_total: f64,
    pub line_count: usize,
    pub blob_path: String,
}

impl StoredTransaction {
    pub fn document(&self) -> Result<Document> {
        Ok(serde_json::from_str(&self.json)?)
    }

    pub fn summary(&self) -> Result<TransactionSummary> {
        let document = self.document()?;

        Ok(TransactionSummary {
            id: self.transaction_id.to_string(),
            integration_service: self.integration.clone(),
            reference_key: self.reference_key.clone(),
            reference_value: self.reference_value.clone(),
            purchase_order_reference: document
                .get("purchaseOrderReference")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            status: TransactionStatus::from_document(&document),
            created_on: self.created_on,
            customer_name: customer_name(&document),
            order_total: document
                .get("totalPriceWithGst")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            line_count: document
                .get("orderLines")
                .and_then(|v| v.as_array())
                .map(Vec::len)
                .unwrap_or(0),
            blob_path: self.blob_path.clone(),
        })
    }

    /// 不分大小寫比對整合服務與參照欄位；空字串視為全部符合
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.integration, &self.reference_key, &self.reference_value]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

fn customer_name(document: &Document) -> Option<String> {
    let shipping = document.get("shippingAddress");
    let part = |key: &str| {
        shipping
            .and_then(|address| address.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    };

    match (part("firstName"), part("lastName")) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        _ => document
            .get("emailAddress")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    }
}

/// 金額格式化，例如 `$1,234.50`；沒有值時顯示 `$0.00`
pub fn format_currency(value: Option<f64>, symbol: &str) -> String {
    let Some(value) = value else {
        return format!("{}0.00", symbol);
    };

    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(json: serde_json::Value) -> StoredTransaction {
        StoredTransaction {
            transaction_id: 42,
            integration: "Shopify Orders".to_string(),
            reference_key: "orderId".to_string(),
            reference_value: "100234".to_string(),
            blob_path: "https://blob.example.com/42.pdf".to_string(),
            created_on: "2024-01-15T10:30:00Z".parse().unwrap(),
            json: json.to_string(),
        }
    }

    #[test]
    fn test_summary_derives_display_fields() {
        let transaction = stored(json!({
            "purchaseOrderReference": "PO-9",
            "emailAddress": "a@b.com",
            "shippingAddress": {"firstName": "Ana", "lastName": "Lee"},
            "cardDetails": {"responseText": "Approved"},
            "totalPriceWithGst": 115.0,
            "orderLines": [{"sku": "K1"}, {"sku": "K2"}]
        }));

        let summary = transaction.summary().unwrap();
        assert_eq!(summary.id, "42");
        assert_eq!(summary.purchase_order_reference.as_deref(), Some("PO-9"));
        assert_eq!(summary.status, TransactionStatus::Completed);
        assert_eq!(summary.customer_name.as_deref(), Some("Ana Lee"));
        assert_eq!(summary.order_total, 115.0);
        assert_eq!(summary.line_count, 2);
    }

    #[test]
    fn test_customer_name_falls_back_to_email() {
        let transaction = stored(json!({
            "emailAddress": "a@b.com",
            "shippingAddress": {"firstName": "Ana", "lastName": ""}
        }));

        let summary = transaction.summary().unwrap();
        assert_eq!(summary.customer_name.as_deref(), Some("a@b.com"));
        assert_eq!(summary.status, TransactionStatus::Pending);
        assert_eq!(summary.order_total, 0.0);
    }

    #[test]
    fn test_malformed_blob_is_an_error() {
        let mut transaction = stored(json!({}));
        transaction.json = "{not json".to_string();
        assert!(transaction.summary().is_err());
    }

    #[test]
    fn test_status_from_response_text() {
        let status = |text: &str| {
            TransactionStatus::from_document(&json!({"cardDetails": {"responseText": text}}))
        };
        assert_eq!(status("Processing"), TransactionStatus::Processing);
        assert_eq!(status("Failed"), TransactionStatus::Failed);
        assert_eq!(status("Declined"), TransactionStatus::Pending);
    }

    #[test]
    fn test_matches_search() {
        let transaction = stored(json!({}));
        assert!(transaction.matches_search(""));
        assert!(transaction.matches_search("shopify"));
        assert!(transaction.matches_search("0023"));
        assert!(!transaction.matches_search("paypal"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(None, "$"), "$0.00");
        assert_eq!(format_currency(Some(19.5), "$"), "$19.50");
        assert_eq!(format_currency(Some(1234567.891), "$"), "$1,234,567.89");
        assert_eq!(format_currency(Some(-1000.0), "$"), "-$1,000.00");
        assert_eq!(format_currency(Some(999.999), "$"), "$1,000.00");
    }
}
