//! Jikan API client.
//!
//! One GET per call, no retries and no backoff: a failed request is terminal
//! for the invocation that issued it.

use super::error::FetchError;
use super::transport::{HttpTransport, ReqwestTransport};
use super::types::*;
use crate::query::{Endpoints, Query};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use shared::Config;
use tracing::{debug, info, warn};
use url::Url;

/// Jikan API v4 client
pub struct JikanClient<T = ReqwestTransport> {
    /// HTTP transport
    transport: T,
    /// Endpoint URL builder
    endpoints: Endpoints,
}

impl JikanClient<ReqwestTransport> {
    /// Create a client against the live API
    pub fn new(config: &Config) -> Result<Self> {
        let transport =
            ReqwestTransport::new(&config.api).context("Failed to create HTTP client")?;
        Self::with_transport(&config.api.base_url, config.listing.clone(), transport)
    }
}

impl<T: HttpTransport> JikanClient<T> {
    /// Create a client over an arbitrary transport
    pub fn with_transport(
        base_url: &str,
        limits: shared::config::ListingConfig,
        transport: T,
    ) -> Result<Self> {
        let endpoints = Endpoints::new(base_url, limits)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        Ok(Self {
            transport,
            endpoints,
        })
    }

    /// Make a GET request and decode the JSON body
    async fn get<R: DeserializeOwned>(&self, url: &Url) -> Result<R, FetchError> {
        let body = self.transport.get(url.as_str()).await?;

        serde_json::from_str(&body).map_err(|source| {
            warn!(url = %url, error = %source, "Failed to parse response");
            FetchError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }

    /// Make a GET request against a single-record endpoint
    async fn get_record<R: DeserializeOwned>(&self, url: &Url) -> Result<R, FetchError> {
        let response: RecordResponse<R> = self.get(url).await?;
        response.data.ok_or_else(|| FetchError::MissingData {
            url: url.to_string(),
        })
    }

    /// Fetch the records of a listing, in response order
    ///
    /// An absent `data` field is an empty listing. Listings with a client
    /// side cap are truncated here.
    pub async fn fetch_listing(&self, query: &Query) -> Result<Vec<MediaRecord>, FetchError> {
        let url = self.endpoints.listing(query);
        debug!(query = query.name(), url = %url, "Fetching listing");

        let response: ListResponse<MediaRecord> = self.get(&url).await?;
        let mut records = response.data;

        if let Some(cap) = self.endpoints.client_cap(query) {
            records.truncate(cap);
        }

        Ok(records)
    }

    /// Fetch anime details, falling back to the reduced endpoint on 404
    ///
    /// Exactly one fallback request is made; any other failure of the
    /// primary request is returned as is.
    pub async fn anime_details(&self, id: &str) -> Result<MediaRecord, FetchError> {
        let primary = self.endpoints.anime_full(id);

        match self.get_record(&primary).await {
            Err(e) if e.is_not_found() => {
                let fallback = self.endpoints.anime(id);
                info!(
                    id = id,
                    primary = e.url(),
                    fallback = %fallback,
                    "Full record not found, using fallback endpoint"
                );
                self.get_record(&fallback).await
            }
            other => other,
        }
    }

    /// Fetch the character list of an anime, truncated to the configured maximum
    pub async fn anime_characters(&self, id: &str) -> Result<Vec<CharacterRecord>, FetchError> {
        let url = self.endpoints.anime_characters(id);
        debug!(id = id, url = %url, "Fetching characters");

        let response: ListResponse<CharacterRecord> = self.get(&url).await?;
        let mut characters = response.data;
        characters.truncate(self.endpoints.limits().characters_max);

        Ok(characters)
    }

    /// Fetch manga details
    pub async fn manga_details(&self, id: &str) -> Result<MediaRecord, FetchError> {
        let url = self.endpoints.manga(id);
        debug!(id = id, url = %url, "Fetching manga details");
        self.get_record(&url).await
    }
}
