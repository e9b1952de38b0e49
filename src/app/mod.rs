// Presentation layer: the terminal session that drives the core.

pub mod render;
pub mod terminal;

use crate::adapters::cat_api::CatApiSource;
use crate::core::acquisition::Acquirer;
use crate::core::{AcquisitionOutcome, ConfigProvider, ExclusionSet};
use crate::utils::error::{ErrorSeverity, FinderError, Result};
use terminal::TerminalSession;
use tokio::io::BufReader;

pub const EXIT_EXHAUSTED: i32 = 4;

/// 根據錯誤嚴重程度決定退出碼
pub fn exit_code(error: &FinderError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(error: &FinderError) {
    tracing::error!(
        "❌ Could not fetch a cat: {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
}

/// Runs one acquisition and prints it. Returns the process exit code.
pub async fn run_once<C: ConfigProvider>(config: &C, exclusions: ExclusionSet) -> Result<i32> {
    let source = CatApiSource::from_config(config)?;
    let acquirer = Acquirer::with_max_attempts(source, config.max_attempts());

    match acquirer.acquire(&exclusions).await {
        AcquisitionOutcome::Accepted { candidate, .. } => {
            print!("{}", render::candidate(&candidate));
            Ok(0)
        }
        AcquisitionOutcome::Exhausted { attempts } => {
            println!(
                "No cat outside the ban list after {} attempts. Try removing a ban.",
                attempts
            );
            Ok(EXIT_EXHAUSTED)
        }
        AcquisitionOutcome::Failed { error, .. } => {
            report_failure(&error);
            Ok(exit_code(&error))
        }
        // 單次執行不會被取代
        AcquisitionOutcome::Superseded { .. } => Ok(0),
    }
}

/// Interactive session on stdin/stdout.
pub async fn run_interactive<C: ConfigProvider>(config: &C, exclusions: ExclusionSet) -> Result<i32> {
    let source = CatApiSource::from_config(config)?;
    let acquirer = Acquirer::with_max_attempts(source, config.max_attempts());
    let session = TerminalSession::new(acquirer, exclusions);

    let state = session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    tracing::info!("👋 Session ended with {} exclusions", state.exclusions.len());
    Ok(0)
}
