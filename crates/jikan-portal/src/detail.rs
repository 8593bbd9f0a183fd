//! Detail page controller.
//!
//! Renders a single record plus, for anime, its character list. The two
//! fetches are independent: each has its own container and request token,
//! and a failure in one leaves the other untouched.

use crate::api::{HttpTransport, JikanClient};
use crate::dom::{Document, RequestToken};
use crate::pipeline::{LoadError, Outcome};
use crate::render::{self, Tone};
use std::sync::Arc;
use tracing::{error, info};

/// Container ids used by the detail pages
#[derive(Debug, Clone)]
pub struct DetailContainers {
    pub anime_detail: String,
    pub anime_characters: String,
    pub manga_detail: String,
}

/// Outcomes of the two independent anime detail renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimePageOutcome {
    pub detail: Outcome,
    pub characters: Outcome,
}

pub struct DetailController<T> {
    client: Arc<JikanClient<T>>,
    document: Document,
    containers: DetailContainers,
}

impl<T: HttpTransport> DetailController<T> {
    pub fn new(
        client: Arc<JikanClient<T>>,
        document: Document,
        containers: DetailContainers,
    ) -> Self {
        Self {
            client,
            document,
            containers,
        }
    }

    /// Render the anime detail and character containers concurrently
    pub async fn show_anime(&self, id: &str) -> AnimePageOutcome {
        let (detail, characters) = tokio::join!(self.anime_detail(id), self.anime_characters(id));
        AnimePageOutcome { detail, characters }
    }

    /// Show the missing-identifier notice in the anime detail container
    pub fn missing_anime_id(&self) -> bool {
        render::message("Anime ID missing in URL.", Tone::Plain)
            .map(|html| self.document.set_html(&self.containers.anime_detail, html))
            .unwrap_or(false)
    }

    /// Show the missing-identifier notice in the manga detail container
    pub fn missing_manga_id(&self) -> bool {
        render::message("Manga ID missing in URL.", Tone::Plain)
            .map(|html| self.document.set_html(&self.containers.manga_detail, html))
            .unwrap_or(false)
    }

    /// Render the anime detail container
    pub async fn anime_detail(&self, id: &str) -> Outcome {
        let container = &self.containers.anime_detail;
        let Some(token) = self.begin(container, "Loading...", Tone::Plain) else {
            return Outcome::Missing;
        };

        let result = self.load_anime(id).await;
        self.finish(&token, id, result, "Failed to load anime details.", Tone::Plain)
    }

    /// Render the character container
    pub async fn anime_characters(&self, id: &str) -> Outcome {
        let container = &self.containers.anime_characters;
        let Some(token) = self.begin(container, "Loading characters...", Tone::Light) else {
            return Outcome::Missing;
        };

        let result = self.load_characters(id).await;
        self.finish(&token, id, result, "Failed to load characters.", Tone::Error)
    }

    /// Render the manga detail container
    pub async fn show_manga(&self, id: &str) -> Outcome {
        let container = &self.containers.manga_detail;
        let Some(token) = self.begin(container, "Loading manga details...", Tone::Plain) else {
            return Outcome::Missing;
        };

        let result = self.load_manga(id).await;
        self.finish(&token, id, result, "Failed to load manga details.", Tone::Plain)
    }

    async fn load_anime(&self, id: &str) -> Result<(Outcome, String), LoadError> {
        let record = self.client.anime_details(id).await?;
        Ok((Outcome::Rendered(1), render::anime_detail(&record)?))
    }

    async fn load_characters(&self, id: &str) -> Result<(Outcome, String), LoadError> {
        let characters = self.client.anime_characters(id).await?;
        if characters.is_empty() {
            let html = render::message("No characters found.", Tone::Light)?;
            return Ok((Outcome::Empty, html));
        }

        Ok((
            Outcome::Rendered(characters.len()),
            render::character_cards(&characters)?,
        ))
    }

    async fn load_manga(&self, id: &str) -> Result<(Outcome, String), LoadError> {
        let record = self.client.manga_details(id).await?;
        Ok((Outcome::Rendered(1), render::manga_detail(&record)?))
    }

    fn begin(&self, container: &str, loading: &str, tone: Tone) -> Option<RequestToken> {
        let token = self.document.begin_request(container)?;
        if let Ok(html) = render::message(loading, tone) {
            self.document.apply(&token, html);
        }
        Some(token)
    }

    fn finish(
        &self,
        token: &RequestToken,
        id: &str,
        result: Result<(Outcome, String), LoadError>,
        failure: &str,
        tone: Tone,
    ) -> Outcome {
        let (outcome, html) = match result {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(
                    container = token.element(),
                    id = id,
                    error = %e,
                    "Failed to load detail"
                );
                let html = render::message(failure, tone).unwrap_or_default();
                (Outcome::Failed, html)
            }
        };

        if !self.document.apply(token, html) {
            return Outcome::Stale;
        }

        info!(
            container = token.element(),
            id = id,
            outcome = ?outcome,
            "Detail rendered"
        );
        outcome
    }
}
