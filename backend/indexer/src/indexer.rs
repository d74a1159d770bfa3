//! Long-running background task that polls the Soroban RPC and writes
//! decoded crisis ledger events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

/// Run the indexer loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting — contract: {}", state.config.contract_id);

    let mut position = match db::load_cursor(&state.pool).await {
        Ok((last_ledger, cursor)) => {
            resume_position(last_ledger, cursor, state.config.start_ledger)
        }
        Err(e) => {
            error!("Failed to load cursor, starting from configured ledger: {e}");
            resume_position(0, None, state.config.start_ledger)
        }
    };
    info!("Resuming from ledger {}", position.ledger);

    let interval = Duration::from_secs(state.config.poll_interval_secs);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = poll_once(&state, &position) => match result {
                Ok(next) => position = next,
                Err(e) => error!("Indexer poll error: {e}"),
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("Indexer stopped at ledger {}", position.ledger);
}

/// Pick the starting point: a persisted ledger wins over the configured one.
fn resume_position(last_ledger: i64, cursor: Option<String>, start_ledger: u32) -> Position {
    if last_ledger > 0 {
        Position {
            ledger: u32::try_from(last_ledger).unwrap_or(u32::MAX),
            cursor,
        }
    } else {
        Position {
            ledger: start_ledger,
            cursor,
        }
    }
}

/// Perform a single poll iteration and persist the resulting position.
async fn poll_once(state: &IndexerState, position: &Position) -> Result<Position> {
    let config = &state.config;
    let page = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = next_position(position, page.latest_ledger, page.next_cursor);
    db::save_cursor(&state.pool, next.ledger as i64, next.cursor.as_deref()).await?;
    Ok(next)
}

/// The ledger never moves backwards; the cursor, when present, resumes
/// pagination inside the current range.
fn next_position(
    current: &Position,
    latest_ledger: Option<u64>,
    cursor: Option<String>,
) -> Position {
    let ledger = latest_ledger
        .map(|l| u32::try_from(l).unwrap_or(u32::MAX).max(current.ledger))
        .unwrap_or(current.ledger);
    Position { ledger, cursor }
}
