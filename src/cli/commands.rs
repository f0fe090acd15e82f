//! Command handler for a reconciliation run

use std::time::{Duration, Instant};

use futures::stream::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::{
    format_size, CatalogClient, MatchClassifier, Reconciler, Reconciliation, ReportRenderer,
    RequestEmitter, RequestKind, SqliteInventory,
};
use crate::cli::args::{Cli, GlobalArgs};
use crate::cli::prompt::confirm;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Search, classify, report, then offer to request missing and outdated data
///
/// `config` is the loaded file configuration; command-line overrides are
/// applied here.
pub async fn handle_reconcile(cli: Cli, mut config: AppConfig) -> Result<()> {
    cli.global.validate().map_err(AppError::generic)?;

    apply_overrides(&mut config, &cli.global);
    config.validate()?;

    let filters = cli.filters.to_filters();
    debug!("Search filters: {:?}", filters);

    let inventory = SqliteInventory::open(&config.inventory.database)?;
    let classifier = MatchClassifier::new(inventory, config.local_node_suffix());
    let client = CatalogClient::new(&config.catalog.to_runtime_config())?;

    let started = Instant::now();
    let spinner = search_spinner(cli.global.quiet);
    let records = client.search(&filters).inspect(|_| spinner.inc(1));
    let outcome = Reconciler::new(&classifier, config.catalog.file_limit)
        .run(records)
        .await;
    spinner.finish_and_clear();
    let reconciliation = outcome?;
    info!(
        "Scanned {} files in {:?}",
        reconciliation.processed,
        started.elapsed()
    );

    let color = config.logging.colored_output && atty::is(atty::Stream::Stdout);
    print!("{}", ReportRenderer::new(color).render(&reconciliation));

    offer_requests(client, &config, &reconciliation).await
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut AppConfig, global: &GlobalArgs) {
    if let Some(url) = &global.search_url {
        config.catalog.search_url = url.clone();
    }
    if let Some(limit) = global.limit {
        config.catalog.file_limit = limit;
    }
    if let Some(database) = &global.database {
        config.inventory.database = database.clone();
    }
    if let Some(suffix) = &global.local_node {
        config.inventory.local_node_suffix = suffix.clone();
    }
    if let Some(dir) = &global.output_dir {
        config.request.output_dir = dir.clone();
    }
}

async fn offer_requests(
    client: CatalogClient,
    config: &AppConfig,
    reconciliation: &Reconciliation,
) -> Result<()> {
    let totals = reconciliation.totals();
    let mut emitter: Option<RequestEmitter> = None;

    let offers = [
        (
            RequestKind::Missing,
            totals.missing_files,
            format!(
                "\nSubmit a request for {} of missing data? (yes/[no]) ",
                format_size(totals.missing_size)
            ),
        ),
        (
            RequestKind::Update,
            totals.partial_files,
            format!(
                "\nRequest updates for {} of partial matches? (yes/[no]) ",
                format_size(totals.partial_size)
            ),
        ),
    ];

    for (kind, files, prompt) in offers {
        if files == 0 || !confirm(&prompt)? {
            continue;
        }

        // The user is only resolved once a request is actually wanted
        if emitter.is_none() {
            emitter = Some(RequestEmitter::new(
                client.clone(),
                config.request.to_runtime_config()?,
            ));
        }
        let Some(active) = emitter.as_ref() else {
            continue;
        };

        let manifest = active
            .emit(kind, &reconciliation.groups_needing(kind))
            .await?;
        println!("\nRequest submitted");
        println!("  {} files listed in {}", manifest.files, manifest.path.display());
    }

    Ok(())
}

fn search_spinner(quiet: bool) -> ProgressBar {
    if quiet || !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message("Searching ESGF...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
