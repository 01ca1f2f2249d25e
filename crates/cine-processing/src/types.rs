//! Wire types for the movie metadata API.

use serde::{Deserialize, Serialize};

/// One page of the `/movie/popular` endpoint.
///
/// Only `results` is consumed; unknown fields are ignored and a missing
/// `results` array decodes as empty so a malformed page contributes nothing
/// instead of failing the whole collection run.
#[derive(Debug, Default, Deserialize)]
pub struct PopularPage {
    #[serde(default)]
    pub results: Vec<MovieRecord>,
}

/// A single movie entry as returned by the metadata API.
///
/// Every field is optional on the wire; records keep their nulls and the
/// preprocessor decides what survives into the cleaned snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}
