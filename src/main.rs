use clap::Parser;
use news_relay::config::LogFormat;
use news_relay::utils::error::ErrorSeverity;
use news_relay::utils::{logger, validation::Validate};
use news_relay::{run_once, AppConfig, CliArgs, RunMode};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("Starting news-relay with {}", args.config);

    let mut config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if let Some(kind) = args.summarizer {
        config.summarizer.kind = kind;
    }
    if args.max_posts.is_some() {
        config.publisher.max_posts = args.max_posts;
    }
    if args.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    let mode = if args.dry_run {
        tracing::info!("🔍 Dry run: nothing will be published or recorded");
        RunMode::DryRun
    } else {
        RunMode::Live
    };

    let validation = match mode {
        RunMode::Live => config.validate(),
        RunMode::DryRun => config.validate_offline(),
    };
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run_once(&config, mode).await {
        Ok(report) => {
            println!(
                "✅ Run complete: {} published, {} failed, {} already posted",
                report.published, report.failed, report.skipped
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
