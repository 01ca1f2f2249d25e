//! Paginated movie metadata collection.
//!
//! [`MovieCollector`] walks the `/movie/popular` endpoint page by page and
//! concatenates the results into a raw snapshot. Failed pages are skipped,
//! not retried: one bad page costs its ~20 rows, never the whole run.

use std::path::PathBuf;
use std::time::Duration;

use polars::prelude::*;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::{Layout, Settings};
use crate::error::Result;
use crate::types::{MovieRecord, PopularPage};
use crate::utils::write_frame;

/// Request timeout for a single page fetch.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Log fetch progress every this many pages.
const PROGRESS_EVERY_PAGES: u32 = 5;

/// Collects popular-movie pages into raw snapshots.
pub struct MovieCollector {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    layout: Layout,
}

impl MovieCollector {
    /// Create a collector from pipeline settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(MovieCollector {
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            language: settings.language.clone(),
            layout: settings.layout(),
        })
    }

    /// Fetch pages `1..=page_limit` and concatenate their results.
    ///
    /// Non-200 responses and transport errors (timeouts included) drop the
    /// affected page with a warning. The returned frame always carries the
    /// raw schema, even with zero rows.
    pub fn fetch_popular(&self, page_limit: u32) -> Result<DataFrame> {
        let mut movies: Vec<MovieRecord> = Vec::new();

        info!("Fetching up to {} pages of popular movies", page_limit);
        for page in 1..=page_limit {
            let url = format!(
                "{}/movie/popular?api_key={}&language={}&page={}",
                self.base_url, self.api_key, self.language, page
            );

            let response = match self.client.get(&url).send() {
                Ok(response) => response,
                Err(e) => {
                    warn!("Page {} request failed: {}", page, e);
                    continue;
                }
            };

            if response.status() != StatusCode::OK {
                warn!(
                    "Page {} returned status {}; skipping",
                    page,
                    response.status()
                );
                continue;
            }

            match response.json::<PopularPage>() {
                Ok(body) => movies.extend(body.results),
                Err(e) => {
                    warn!("Page {} body was not decodable: {}", page, e);
                    continue;
                }
            }

            if page % PROGRESS_EVERY_PAGES == 0 {
                info!("Progress: {}/{} pages fetched", page, page_limit);
            }
        }

        info!("Collected {} movie records", movies.len());
        records_to_frame(&movies)
    }

    /// Persist a raw snapshot under `raw/<run_id>/<run_id>.csv`.
    ///
    /// Idempotent per run: re-running a collection overwrites the same path.
    pub fn save_raw(&self, df: &mut DataFrame, run_id: &str) -> Result<PathBuf> {
        let path = self.layout.raw_csv(run_id);
        write_frame(df, &path)?;
        info!("Raw snapshot saved: {}", path.display());
        Ok(path)
    }
}

/// Build the raw snapshot frame from collected records.
pub fn records_to_frame(records: &[MovieRecord]) -> Result<DataFrame> {
    let df = df!(
        "id" => records.iter().map(|m| m.id).collect::<Vec<i64>>(),
        "title" => records.iter().map(|m| m.title.clone()).collect::<Vec<Option<String>>>(),
        "original_language" => records
            .iter()
            .map(|m| m.original_language.clone())
            .collect::<Vec<Option<String>>>(),
        "release_date" => records
            .iter()
            .map(|m| m.release_date.clone())
            .collect::<Vec<Option<String>>>(),
        "popularity" => records.iter().map(|m| m.popularity).collect::<Vec<Option<f64>>>(),
        "vote_count" => records.iter().map(|m| m.vote_count).collect::<Vec<Option<i64>>>(),
        "vote_average" => records.iter().map(|m| m.vote_average).collect::<Vec<Option<f64>>>(),
    )?;
    Ok(df)
}
