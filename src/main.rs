use clap::Parser;
use company_etl::config::args::{Command, FetchArgs, LogFormat, MatchArgs, MergeArgs};
use company_etl::config::{MatchSettings, MergeSettings};
use company_etl::core::matching::FuzzyNameMatcher;
use company_etl::utils::logger;
use company_etl::utils::validation::Validate;
use company_etl::{
    CliConfig, EtlEngine, EtlError, FetchPipeline, HttpSearchSource, LocalStorage, MatchPipeline,
    MergePipeline, Result,
};

async fn run_fetch(args: FetchArgs) -> Result<Option<String>> {
    let settings = args.into_settings()?;
    settings.validate()?;
    tracing::debug!(
        "Fetch settings: {:?} {} → {} ({})",
        settings.dataset,
        settings.query.founded_from,
        settings.query.founded_to,
        settings.endpoint
    );

    let source = HttpSearchSource::new(&settings.endpoint, &settings.api_key)?;
    let pipeline = FetchPipeline::new(LocalStorage::default(), source, settings);
    EtlEngine::new(pipeline).run().await
}

async fn run_merge(args: MergeArgs) -> Result<Option<String>> {
    let settings = MergeSettings::from(args);
    settings.validate()?;

    let pipeline = MergePipeline::new(LocalStorage::default(), settings);
    EtlEngine::new(pipeline).run().await
}

async fn run_match(args: MatchArgs) -> Result<Option<String>> {
    let settings = MatchSettings::from(args);
    settings.validate()?;

    let matcher = FuzzyNameMatcher::new(settings.matcher.clone());
    let pipeline = MatchPipeline::new(LocalStorage::default(), settings, matcher);
    EtlEngine::new(pipeline).run().await
}

fn report_failure(e: &EtlError) -> i32 {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    e.exit_code()
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Text => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(),
    }
    tracing::debug!("CLI config: {:?}", config);

    let result = match config.command {
        Command::Fetch(args) => run_fetch(args).await,
        Command::Merge(args) => run_merge(args).await,
        Command::Match(args) => run_match(args).await,
    };

    match result {
        Ok(Some(output_path)) => {
            tracing::info!("✅ Done: {}", output_path);
        }
        Ok(None) => {
            tracing::info!("✅ Done, no output file written");
        }
        Err(e) => {
            let exit_code = report_failure(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
