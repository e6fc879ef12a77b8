use anyhow::Context;
use clap::Parser;
use daily_card::adapters::archive::ArchiveClient;
use daily_card::config::cli::DownloadArgs;
use daily_card::core::downloader::MetadataDownloader;
use daily_card::utils::logger;
use daily_card::LocalStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = DownloadArgs::parse();

    logger::init_logger(args.verbose, &args.log_format);

    let config = args
        .into_config()
        .context("Invalid downloader configuration")?;
    tracing::info!(
        "📥 Downloading {} collections from {}",
        config.collections.len(),
        config.api_base
    );

    let client = ArchiveClient::new(config.token.clone()).with_base_url(config.api_base.clone());
    let storage = LocalStorage::new(config.output_dir.clone());
    let downloader = MetadataDownloader::new(client, storage)
        .with_per_page(config.per_page)
        .with_page_delay(config.page_delay());

    let summary = downloader
        .download_all(&config.collections)
        .await
        .context("Failed to write metadata files")?;

    for failed in summary.failed() {
        tracing::warn!(
            "Collection {} stopped early after {} items: {}",
            failed.collection,
            failed.items,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    if summary.files_written.is_empty() {
        anyhow::bail!("No items were downloaded from any collection; check NYPL_TOKEN and the API response");
    }

    println!(
        "✅ {} items from {} collections written to {}",
        summary.total_items,
        summary.collections_with_items(),
        config.output_dir
    );
    Ok(())
}
