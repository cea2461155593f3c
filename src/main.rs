use anyhow::Context;
use clap::Parser;
use propshare::adapters::report;
use propshare::config::input::load_properties;
use propshare::utils::error::ErrorSeverity;
use propshare::utils::{logger, validation::Validate};
use propshare::{CliConfig, InvestmentModel, InvestmentReport, ModelConfig, ModelError};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    let log_format = if config.log_json {
        logger::LogFormat::Json
    } else {
        logger::LogFormat::Compact
    };
    logger::init_logger(config.verbose, log_format);

    tracing::info!("Starting propshare CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 載入模型假設
    let mut assumptions = match &config.assumptions {
        Some(path) => {
            tracing::info!("📁 Loading assumptions from: {}", path);
            ModelConfig::from_file(path)
                .with_context(|| format!("Failed to load assumptions file '{}'", path))?
        }
        None => ModelConfig::default(),
    };

    // 應用命令列覆蓋設定
    if !config.years.is_empty() {
        assumptions = assumptions.with_holding_periods(config.years.clone());
        tracing::info!("🔧 Holding periods overridden to: {:?}", config.years);
    }

    if let Err(e) = assumptions.validate() {
        tracing::error!("❌ Assumptions validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let records = load_properties(&config.property)
        .with_context(|| format!("Failed to load property file '{}'", config.property))?;
    tracing::info!("Loaded {} property record(s)", records.len());

    let model = InvestmentModel::new(assumptions);
    let mut reports: Vec<InvestmentReport> = Vec::with_capacity(records.len());
    let mut worst: Option<ModelError> = None;

    for record in &records {
        match model.evaluate(record) {
            Ok(report) => {
                for warning in &report.warnings {
                    tracing::warn!("⚠️ {}: {}", report.listing.property.id, warning);
                }
                reports.push(report);
            }
            Err(e) => {
                tracing::error!(
                    "❌ Property '{}' failed: {} (Category: {:?}, Severity: {:?})",
                    record.id,
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}: {}", record.id, e.user_friendly_message());
                keep_worst(&mut worst, e);
            }
        }
    }

    // 投資人持股試算只針對單一物件
    let position = match (config.shares, reports.as_slice()) {
        (Some(shares), [report]) => match model.position(report, shares) {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::error!(
                    "❌ Position for {} shares failed: {} (Category: {:?}, Severity: {:?})",
                    shares,
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}", e.user_friendly_message());
                keep_worst(&mut worst, e);
                None
            }
        },
        (Some(_), _) => {
            tracing::warn!("--shares applies to a single property; skipping position");
            None
        }
        (None, _) => None,
    };

    if config.json {
        let json = report::to_json(&reports, position.as_ref(), chrono::Utc::now())?;
        println!("{}", json);
    } else {
        for report_item in &reports {
            println!("{}", report::render_report(report_item));
        }
        if let Some(position) = &position {
            println!("{}", report::render_position(position));
        }
    }

    if let Some(path) = &config.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create CSV file '{}'", path))?;
        report::write_projection_csv(&reports, file)?;
        tracing::info!("📁 Projection table saved to: {}", path);
    }

    // 根據錯誤嚴重程度決定退出碼
    if let Some(e) = worst {
        let exit_code = exit_code(e.severity());
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn keep_worst(worst: &mut Option<ModelError>, e: ModelError) {
    if worst.as_ref().map_or(true, |w| e.severity() > w.severity()) {
        *worst = Some(e);
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_error_sets_exit_code() {
        let mut worst = None;
        let position_error = ModelError::invalid_input("shares", 999_999, "Share count must be between 1 and 1749");
        keep_worst(&mut worst, position_error);

        let e = worst.unwrap();
        assert_eq!(e.severity(), ErrorSeverity::Medium);
        assert_eq!(exit_code(e.severity()), 2);

        let below_minimum = ModelError::InvestmentOutOfRange {
            amount: 500.0,
            min: 1000.0,
            max: 3_232_000.0,
        };
        assert_eq!(exit_code(below_minimum.severity()), 2);
    }

    #[test]
    fn test_keep_worst_prefers_higher_severity() {
        let mut worst = None;
        keep_worst(&mut worst, ModelError::ConfigError { message: "bad".to_string() });
        keep_worst(&mut worst, ModelError::invalid_input("shares", 0, "too few"));

        let e = worst.unwrap();
        assert!(matches!(e, ModelError::ConfigError { .. }));
        assert_eq!(exit_code(e.severity()), exit_code(ErrorSeverity::High));
    }
}
