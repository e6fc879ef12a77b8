use clap::Parser;
use daily_card::core::catalog::Catalog;
use daily_card::utils::logger;
use daily_card::{
    BroadcastEngine, BroadcastError, CliConfig, HttpImageVerifier, LocalStorage, PostedStore,
    ResendBroadcaster, ResendClient, SendConfirmation,
};

fn report_failure(e: &BroadcastError) -> ! {
    tracing::error!(
        "❌ Daily card run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, &cli.log_format);
    tracing::info!("Starting daily-card");

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            report_failure(&e);
        }
    };
    tracing::debug!("Config: {:?}", config);

    if config.dry_run {
        tracing::info!("🔍 Dry run: the posted list will not be updated");
    }

    // Relative paths resolve against the working directory.
    let storage = LocalStorage::new(".".to_string());

    let catalog = match Catalog::load(&storage, &config.metadata_path).await {
        Ok(catalog) => catalog,
        Err(e) => report_failure(&e),
    };

    let verifier = HttpImageVerifier::new(config.image_base_url.clone(), config.artifact_dir.clone())
        .with_timeout(config.image_timeout());
    let client = ResendClient::new(config.resend_api_key.clone())
        .with_base_url(config.resend_api_base.clone());
    let broadcaster = ResendBroadcaster::new(client, config.template());
    let posted_store = PostedStore::new(storage, config.posted_path.clone());

    let engine = BroadcastEngine::new(verifier, broadcaster, posted_store)
        .with_retry_policy(config.retry_policy())
        .with_dry_run(config.dry_run);

    match engine.run(&catalog).await {
        Ok(report) => {
            tracing::info!(
                "✅ Sent '{}' (card {}) as broadcast {} after {} attempt(s)",
                report.title,
                report.card_id,
                report.broadcast_id,
                report.attempts
            );
            if let SendConfirmation::Unconfirmed { response_id } = &report.confirmation {
                tracing::warn!(
                    "Provider did not confirm the send (response id: {:?})",
                    response_id
                );
            }
            println!("✅ Broadcast {} sent: {}", report.broadcast_id, report.title);
        }
        Err(e) => report_failure(&e),
    }
}
