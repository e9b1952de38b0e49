use clap::Parser;
use feline_finder::app;
use feline_finder::core::ConfigProvider;
use feline_finder::utils::{logger, validation::Validate};
use feline_finder::{ExclusionSet, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-finder")]
#[command(about = "feline-finder with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "feline-finder.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override max attempts from config
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Fetch one cat, print it and exit
    #[arg(long)]
    once: bool,

    /// Show the effective configuration without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(max_attempts) = args.max_attempts {
        config.acquisition.max_attempts = max_attempts;
        tracing::info!("🔧 Max attempts overridden to: {}", max_attempts);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(app::exit_code(&e));
    }

    if args.dry_run {
        println!("Base URL:      {}", config.api_base_url());
        println!("Max attempts:  {}", config.max_attempts());
        println!("Timeout:       {:?}", config.request_timeout());
        println!("API key:       set");
        return Ok(());
    }

    let result = if args.once {
        app::run_once(&config, ExclusionSet::new()).await
    } else {
        app::run_interactive(&config, ExclusionSet::new()).await
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(app::exit_code(&e));
        }
    }
}
