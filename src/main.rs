use clap::Parser;
use feline_finder::app;
use feline_finder::utils::{logger, validation::Validate};
use feline_finder::{CliConfig, ExclusionSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting feline-finder");
    tracing::debug!(
        "Base URL: {}, max attempts: {}, timeout: {:?}",
        config.api_base_url,
        config.max_attempts,
        config.timeout_seconds
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(app::exit_code(&e));
    }

    let exclusions: ExclusionSet = config.bans.iter().cloned().collect();
    if !exclusions.is_empty() {
        tracing::info!("🚫 Starting with {} exclusions", exclusions.len());
    }

    let result = if config.once {
        app::run_once(&config, exclusions).await
    } else {
        app::run_interactive(&config, exclusions).await
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("❌ {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(app::exit_code(&e));
        }
    }
}
