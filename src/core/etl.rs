use crate::core::Pipeline;
use crate::utils::error::{MapperError, Result};

/// 執行 extract → 驗證/轉換 → load 的流程
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    fail_on_rejections: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            fail_on_rejections: false,
        }
    }

    /// 有任何交易驗證失敗時，匯出後仍回傳 `ValidationError`
    pub fn fail_on_rejections(mut self, enabled: bool) -> Self {
        self.fail_on_rejections = enabled;
        self
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting mapping run");

        tracing::info!("📥 Extracting transactions...");
        let documents = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} transactions", documents.len());

        tracing::info!("🔄 Validating and transforming...");
        let result = self.pipeline.transform(documents).await?;
        tracing::info!(
            "🔄 {} transformed, {} rejected",
            result.accepted.len(),
            result.rejected.len()
        );

        let rejected = result.rejected.len();
        let first_rejection = result
            .rejected
            .first()
            .map(|r| format!("{}: {}", r.reference, r.errors.join("; ")));

        tracing::info!("💾 Loading output...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        if self.fail_on_rejections {
            if let Some(first) = first_rejection {
                return Err(MapperError::ValidationError {
                    message: format!("{} transaction(s) rejected, first: {}", rejected, first),
                });
            }
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Document, MappingRunResult, Rejection};
    use serde_json::json;

    struct StaticPipeline {
        rejected: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for StaticPipeline {
        async fn extract(&self) -> Result<Vec<Document>> {
            Ok(vec![json!({"id": "1"})])
        }

        async fn transform(&self, documents: Vec<Document>) -> Result<MappingRunResult> {
            let mut result = MappingRunResult::default();
            if self.rejected {
                result.rejected.push(Rejection {
                    reference: "1".to_string(),
                    errors: vec!["Email: No source field selected".to_string()],
                });
            } else {
                result.accepted = documents;
            }
            Ok(result)
        }

        async fn load(&self, _result: MappingRunResult) -> Result<String> {
            Ok("out/result.zip".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_returns_output_path() {
        let engine = EtlEngine::new(StaticPipeline { rejected: false }).fail_on_rejections(true);
        assert_eq!(engine.run().await.unwrap(), "out/result.zip");
    }

    #[tokio::test]
    async fn test_rejections_only_fail_when_requested() {
        let lenient = EtlEngine::new(StaticPipeline { rejected: true });
        assert!(lenient.run().await.is_ok());

        let strict = EtlEngine::new(StaticPipeline { rejected: true }).fail_on_rejections(true);
        let err = strict.run().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: 1 transaction(s) rejected, first: 1: Email: No source field selected"
        );
    }
}
