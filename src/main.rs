use clap::Parser;
use erp_mapper::core::path::{enumerate_paths, line_item_keys};
use erp_mapper::core::pipeline::{ExportFormat, ExportOptions};
use erp_mapper::core::Pipeline;
use erp_mapper::domain::mapping::AddressKind;
use erp_mapper::utils::error::{ErrorSeverity, MapperError};
use erp_mapper::utils::{logger, validation::Validate};
use erp_mapper::{CliConfig, EtlEngine, LocalStorage, MappingConfig, MappingPipeline, MappingPlan};

const DEFAULT_OUTPUT_PATH: &str = "./output";

/// 讀取對照設定；未指定時使用內建預設
fn load_mapping(config: &mut CliConfig) -> Result<(MappingPlan, ExportOptions), MapperError> {
    let Some(path) = config.mapping_config.clone() else {
        tracing::info!("📋 No mapping config given, using built-in defaults");
        let mut export = ExportOptions::default();
        apply_format_override(config, &mut export)?;
        return Ok((MappingPlan::defaults(), export));
    };

    tracing::info!("📋 Loading mapping config: {}", path);
    let mapping = MappingConfig::from_file(&path)?;
    mapping.validate()?;
    tracing::info!(
        "📋 Mapping '{}' {}",
        mapping.mapping.name,
        mapping.mapping.version.as_deref().unwrap_or("")
    );

    // 命令列未改輸出目錄時採用設定檔的
    if config.output_path == DEFAULT_OUTPUT_PATH {
        if let Some(output_path) = mapping.output_path() {
            config.output_path = output_path.to_string();
        }
    }

    let mut export = mapping.export_options()?;
    apply_format_override(config, &mut export)?;
    Ok((mapping.plan(), export))
}

fn apply_format_override(config: &CliConfig, export: &mut ExportOptions) -> Result<(), MapperError> {
    if !config.output_formats.is_empty() {
        export.formats = config
            .output_formats
            .iter()
            .map(|f| f.parse::<ExportFormat>())
            .collect::<Result<Vec<_>, _>>()?;
    }
    Ok(())
}

fn report_failure(e: &MapperError) -> i32 {
    tracing::error!(
        "❌ Mapping run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,      // 有交易被拒，但匯出已完成
        ErrorSeverity::Medium => 2,   // 資料錯誤
        ErrorSeverity::High => 1,     // 設定錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_json);

    tracing::info!("Starting erp-mapper CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let (plan, export) = match load_mapping(&mut config) {
        Ok(loaded) => loaded,
        Err(e) => std::process::exit(report_failure(&e)),
    };

    let coverage = plan.coverage();
    tracing::info!("📊 Required fields: {}", coverage);
    if !coverage.is_complete() {
        tracing::warn!("⚠️ Some required fields have no source or user defined value");
    }

    let search = config.search.clone();
    let fail_on_rejections = config.fail_on_rejections;
    let list_paths = config.list_paths;

    // 輸入路徑由使用者給定，不加根目錄
    let input = LocalStorage::new(String::new());
    let output = LocalStorage::new(config.output_path.clone());
    let pipeline = MappingPipeline::new(input, output, config, plan, export).with_search(search);

    if list_paths {
        match pipeline.extract().await {
            Ok(documents) => {
                let Some(first) = documents.first() else {
                    eprintln!("⚠️ No transactions found");
                    return Ok(());
                };
                for path in enumerate_paths(first) {
                    println!("{}", path);
                }
                for kind in AddressKind::ALL {
                    println!("{}\t{}", kind.token(), kind.label());
                }
                let keys = line_item_keys(first);
                if !keys.is_empty() {
                    println!("\nLine item keys: {}", keys.join(", "));
                }
            }
            Err(e) => std::process::exit(report_failure(&e)),
        }
        return Ok(());
    }

    let engine = EtlEngine::new(pipeline).fail_on_rejections(fail_on_rejections);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Mapping run completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Mapping run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
