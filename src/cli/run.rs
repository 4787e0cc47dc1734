use tabled::Table;

use crate::{
    Error, Res,
    cli::{auth_flow, spinner},
    config::{Config, MAX_RECENT_PLAYS_LIMIT},
    db::Database,
    etl::{RunOptions, RunOutcome, run_once},
    info,
    spotify::{RetryPolicy, SpotifyClient},
    success,
    types::{LoadTableRow, RecentPlaysQuery},
    utils,
};

/// Syncs the recently played tracks into the database.
///
/// The access token is obtained before the spinner starts, so the consent
/// screen prompt of a first run stays readable.
pub async fn run(config: &Config, limit: Option<u32>, after: Option<String>) -> Res<()> {
    let limit = limit.unwrap_or(config.recent_plays_limit);
    if !(1..=MAX_RECENT_PLAYS_LIMIT).contains(&limit) {
        return Err(Error::Config(format!(
            "--limit must be between 1 and {}, got {}",
            MAX_RECENT_PLAYS_LIMIT, limit
        )));
    }
    let after = after.as_deref().map(utils::parse_after).transpose()?;

    let flow = auth_flow(config);
    flow.get_valid_access_token().await?;

    let api = SpotifyClient::new(config);
    let mut db = Database::open(&config.database_path)?;
    let options = RunOptions {
        query: RecentPlaysQuery { limit, after },
        retry: RetryPolicy::default(),
    };

    let pb = spinner("Starting sync...");
    let outcome = run_once(&flow, &api, &mut db, &options, &pb).await;
    pb.finish_and_clear();

    match outcome? {
        RunOutcome::NothingNew => info!("No tracks played since the last sync."),
        RunOutcome::Loaded(report) => {
            let rows: Vec<LoadTableRow> = report
                .tables
                .iter()
                .map(|t| LoadTableRow {
                    table: t.table.to_string(),
                    inserted: t.inserted,
                    already_stored: t.skipped,
                })
                .collect();
            println!("{}", Table::new(rows));
            success!(
                "{} new plays stored in {}",
                report.inserted("play_events"),
                config.database_path.display()
            );
        }
    }
    Ok(())
}
