//! Markup renderers.
//!
//! Pure functions from API records to HTML fragments. Templates live in
//! `templates/` and are HTML-escaped by askama; every absent field is
//! replaced by a literal placeholder before it reaches a template.

use crate::api::types::{CharacterRecord, MediaRecord, NamedEntity};
use askama::Template;
use std::fmt::Display;
use thiserror::Error;
use url::form_urlencoded;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const TO_BE_ANNOUNCED: &str = "TBA";
pub const NO_SYNOPSIS: &str = "No synopsis available.";
pub const NO_VOICE_ACTOR: &str = "No Voice artist found";

pub const ANIME_DETAIL_PAGE: &str = "anime-details.html";
pub const ANIME_ID_PARAM: &str = "animeId";
pub const MANGA_DETAIL_PAGE: &str = "manga-details.html";
pub const MANGA_ID_PARAM: &str = "mangaId";

#[derive(Debug, Error)]
#[error("failed to render markup: {0}")]
pub struct RenderError(#[from] askama::Error);

/// Which card layout a listing uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Anime,
    Manga,
}

/// Styling of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    /// Light text for dark panels
    Light,
    Error,
}

impl Tone {
    fn color(self) -> Option<&'static str> {
        match self {
            Tone::Plain => None,
            Tone::Light => Some("white"),
            Tone::Error => Some("red"),
        }
    }
}

#[derive(Template)]
#[template(path = "anime_card.html")]
struct AnimeCard<'a> {
    href: String,
    image_url: &'a str,
    title: &'a str,
    media_type: &'a str,
    episodes: String,
    score: String,
}

#[derive(Template)]
#[template(path = "manga_card.html")]
struct MangaCard<'a> {
    href: String,
    image_url: &'a str,
    title: &'a str,
    media_type: &'a str,
    chapters: String,
    volumes: String,
    score: String,
}

#[derive(Template)]
#[template(path = "anime_detail.html")]
struct AnimeDetail<'a> {
    poster: &'a str,
    title: &'a str,
    title_japanese: Option<&'a str>,
    score: String,
    episodes: String,
    media_type: &'a str,
    genres: Vec<&'a str>,
    studios: String,
    producers: String,
    synopsis: &'a str,
    trailer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "manga_detail.html")]
struct MangaDetail<'a> {
    poster: &'a str,
    title: &'a str,
    media_type: &'a str,
    chapters: String,
    volumes: String,
    score: String,
    status: &'a str,
    published: &'a str,
    synopsis: &'a str,
}

#[derive(Clone, Copy)]
struct VoiceActorView<'a> {
    name: &'a str,
    image_url: &'a str,
}

#[derive(Template)]
#[template(path = "character_card.html")]
struct CharacterCard<'a> {
    image_url: &'a str,
    name: &'a str,
    role: &'a str,
    voice_actor: Option<VoiceActorView<'a>>,
}

#[derive(Template)]
#[template(
    source = r#"<p{% if let Some(color) = color %} style="color:{{ color }};"{% endif %}>{{ text }}</p>"#,
    ext = "html"
)]
struct Message<'a> {
    text: &'a str,
    color: Option<&'static str>,
}

#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
struct Text<'a> {
    text: &'a str,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn or_placeholder<T: Display>(value: Option<T>, placeholder: &str) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| placeholder.to_string())
}

fn join_names(entities: &[NamedEntity]) -> String {
    let names: Vec<&str> = entities
        .iter()
        .filter_map(|e| present(e.name.as_deref()))
        .collect();

    if names.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        names.join(", ")
    }
}

/// Relative link to a detail page with the identifier in its query string
///
/// Records without an identifier link to `#`.
pub fn detail_href(page: &str, param: &str, id: Option<u64>) -> String {
    match id {
        Some(id) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(param, &id.to_string())
                .finish();
            format!("{page}?{query}")
        }
        None => "#".to_string(),
    }
}

pub fn anime_card(record: &MediaRecord) -> Result<String, RenderError> {
    let card = AnimeCard {
        href: detail_href(ANIME_DETAIL_PAGE, ANIME_ID_PARAM, record.mal_id),
        image_url: record.image_url().unwrap_or_default(),
        title: present(record.display_title()).unwrap_or(UNKNOWN),
        media_type: present(record.media_type.as_deref()).unwrap_or(UNKNOWN),
        episodes: or_placeholder(record.episodes, TO_BE_ANNOUNCED),
        score: or_placeholder(record.score, NOT_AVAILABLE),
    };
    Ok(card.render()?)
}

pub fn manga_card(record: &MediaRecord) -> Result<String, RenderError> {
    let card = MangaCard {
        href: detail_href(MANGA_DETAIL_PAGE, MANGA_ID_PARAM, record.mal_id),
        image_url: record.image_url().unwrap_or_default(),
        title: present(record.display_title()).unwrap_or(UNKNOWN),
        media_type: present(record.media_type.as_deref()).unwrap_or(NOT_AVAILABLE),
        chapters: or_placeholder(record.chapters, TO_BE_ANNOUNCED),
        volumes: or_placeholder(record.volumes, NOT_AVAILABLE),
        score: or_placeholder(record.score, NOT_AVAILABLE),
    };
    Ok(card.render()?)
}

/// Concatenate one card per record, in record order
pub fn cards(kind: CardKind, records: &[MediaRecord]) -> Result<String, RenderError> {
    records
        .iter()
        .map(|record| match kind {
            CardKind::Anime => anime_card(record),
            CardKind::Manga => manga_card(record),
        })
        .collect()
}

pub fn anime_detail(record: &MediaRecord) -> Result<String, RenderError> {
    let detail = AnimeDetail {
        poster: record.large_image_url().unwrap_or_default(),
        title: present(record.display_title()).unwrap_or(UNKNOWN),
        title_japanese: present(record.title_japanese.as_deref()),
        score: or_placeholder(record.score, NOT_AVAILABLE),
        episodes: or_placeholder(record.episodes, TO_BE_ANNOUNCED),
        media_type: present(record.media_type.as_deref()).unwrap_or(NOT_AVAILABLE),
        genres: record
            .genres
            .iter()
            .filter_map(|g| present(g.name.as_deref()))
            .collect(),
        studios: join_names(&record.studios),
        producers: join_names(&record.producers),
        synopsis: present(record.synopsis.as_deref()).unwrap_or(NO_SYNOPSIS),
        trailer: record.trailer_embed_url(),
    };
    Ok(detail.render()?)
}

pub fn manga_detail(record: &MediaRecord) -> Result<String, RenderError> {
    let detail = MangaDetail {
        poster: record.large_image_url().unwrap_or_default(),
        title: present(record.display_title()).unwrap_or(UNKNOWN),
        media_type: present(record.media_type.as_deref()).unwrap_or(NOT_AVAILABLE),
        chapters: or_placeholder(record.chapters, NOT_AVAILABLE),
        volumes: or_placeholder(record.volumes, NOT_AVAILABLE),
        score: or_placeholder(record.score, NOT_AVAILABLE),
        status: present(record.status.as_deref()).unwrap_or(NOT_AVAILABLE),
        published: present(
            record
                .published
                .as_ref()
                .and_then(|p| p.string.as_deref()),
        )
        .unwrap_or(NOT_AVAILABLE),
        synopsis: present(record.synopsis.as_deref()).unwrap_or(NO_SYNOPSIS),
    };
    Ok(detail.render()?)
}

pub fn character_card(record: &CharacterRecord) -> Result<String, RenderError> {
    let character = record.character.as_ref();
    let voice_actor = record
        .japanese_voice_actor()
        .and_then(|va| va.person.as_ref())
        .map(|person| VoiceActorView {
            name: present(person.name.as_deref()).unwrap_or(UNKNOWN),
            image_url: person.image_url().unwrap_or_default(),
        });

    let card = CharacterCard {
        image_url: character.and_then(|c| c.image_url()).unwrap_or_default(),
        name: present(character.and_then(|c| c.name.as_deref())).unwrap_or(UNKNOWN),
        role: present(record.role.as_deref()).unwrap_or(UNKNOWN),
        voice_actor,
    };
    Ok(card.render()?)
}

/// Concatenate one character card per entry, in list order
pub fn character_cards(characters: &[CharacterRecord]) -> Result<String, RenderError> {
    characters.iter().map(character_card).collect()
}

/// Status paragraph (loading, empty or failure notice)
pub fn message(text: &str, tone: Tone) -> Result<String, RenderError> {
    Ok(Message {
        text,
        color: tone.color(),
    }
    .render()?)
}

/// Escape plain text for use as element content
pub fn text(text: &str) -> Result<String, RenderError> {
    Ok(Text { text }.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ImageSet, Images, Person, Trailer, VoiceActor};
    use crate::dom::Location;

    fn images(url: &str) -> Option<Images> {
        Some(Images {
            jpg: Some(ImageSet {
                image_url: Some(url.to_string()),
                large_image_url: Some(format!("{url}.large")),
                ..Default::default()
            }),
            webp: None,
        })
    }

    fn entity(name: &str) -> NamedEntity {
        NamedEntity {
            mal_id: Some(1),
            entity_type: Some("anime".to_string()),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_anime_card_fields() {
        let record = MediaRecord {
            mal_id: Some(5114),
            title: Some("Fullmetal Alchemist: Brotherhood".to_string()),
            images: images("fmab.jpg"),
            media_type: Some("TV".to_string()),
            episodes: Some(64),
            score: Some(9.1),
            ..Default::default()
        };

        let html = anime_card(&record).unwrap();
        assert!(html.contains(r#"href="anime-details.html?animeId=5114""#));
        assert!(html.contains(r#"src="fmab.jpg""#));
        assert!(html.contains("<h3>Fullmetal Alchemist: Brotherhood</h3>"));
        assert!(html.contains("<p>TV | Episodes: 64</p>"));
        assert!(html.contains("<p>Rating: 9.1</p>"));
    }

    #[test]
    fn test_empty_record_uses_placeholders() {
        let record = MediaRecord::default();

        for html in [anime_card(&record).unwrap(), manga_card(&record).unwrap()] {
            assert!(!html.contains("undefined"));
            assert!(html.contains(r##"href="#""##));
            assert!(html.contains("<h3>Unknown</h3>"));
            assert!(html.contains("Rating: N/A"));
        }

        let anime = anime_card(&record).unwrap();
        assert!(anime.contains("<p>Unknown | Episodes: TBA</p>"));

        let manga = manga_card(&record).unwrap();
        assert!(manga.contains("<p>N/A | Chapters: TBA</p>"));
        assert!(manga.contains("<p>Volumes: N/A</p>"));
    }

    #[test]
    fn test_zero_counts_are_values() {
        // A reported zero is data, not an absent field
        let record = MediaRecord {
            mal_id: Some(1),
            title: Some("Pilot".to_string()),
            episodes: Some(0),
            score: Some(0.0),
            ..Default::default()
        };

        let html = anime_card(&record).unwrap();
        assert!(html.contains("Episodes: 0"));
        assert!(html.contains("Rating: 0"));
        assert!(!html.contains(TO_BE_ANNOUNCED));
        assert!(!html.contains(NOT_AVAILABLE));
    }

    #[test]
    fn test_blank_title_falls_back() {
        let record = MediaRecord {
            title: Some("  ".to_string()),
            name: Some("Madhouse".to_string()),
            ..Default::default()
        };
        assert!(anime_card(&record).unwrap().contains("<h3>Unknown</h3>"));

        let named = MediaRecord {
            name: Some("Madhouse".to_string()),
            ..Default::default()
        };
        assert!(anime_card(&named).unwrap().contains("<h3>Madhouse</h3>"));
    }

    #[test]
    fn test_free_text_is_escaped() {
        let record = MediaRecord {
            mal_id: Some(1),
            title: Some(r#"<script>alert("x")</script>"#.to_string()),
            ..Default::default()
        };

        let html = anime_card(&record).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains(r#"alt="<script>"#));
    }

    #[test]
    fn test_detail_href_round_trips() {
        for id in [1_u64, 5114, 52991, u64::MAX] {
            let href = detail_href(ANIME_DETAIL_PAGE, ANIME_ID_PARAM, Some(id));
            let location = Location::parse(&href);
            assert_eq!(location.path(), "/anime-details.html");
            assert_eq!(location.param(ANIME_ID_PARAM), Some(id.to_string().as_str()));
        }
        assert_eq!(detail_href(MANGA_DETAIL_PAGE, MANGA_ID_PARAM, None), "#");
    }

    #[test]
    fn test_cards_keep_order() {
        let records: Vec<MediaRecord> = ["First", "Second", "Third"]
            .iter()
            .map(|t| MediaRecord {
                title: Some(t.to_string()),
                ..Default::default()
            })
            .collect();

        let html = cards(CardKind::Anime, &records).unwrap();
        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        let third = html.find("Third").unwrap();
        assert!(first < second && second < third);
        assert_eq!(html.matches("anime-card").count(), 3);
        assert_eq!(cards(CardKind::Manga, &[]).unwrap(), "");
    }

    #[test]
    fn test_anime_detail_full_record() {
        let record = MediaRecord {
            mal_id: Some(5114),
            title: Some("Fullmetal Alchemist: Brotherhood".to_string()),
            title_japanese: Some("鋼の錬金術師".to_string()),
            images: images("poster"),
            score: Some(9.1),
            episodes: Some(64),
            media_type: Some("TV".to_string()),
            genres: vec![entity("Action"), entity("Adventure")],
            studios: vec![entity("Bones")],
            producers: vec![entity("Aniplex"), entity("Square Enix")],
            synopsis: Some("Two brothers.".to_string()),
            trailer: Some(Trailer {
                embed_url: Some("https://www.youtube.com/embed/abc".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let html = anime_detail(&record).unwrap();
        assert!(html.contains(r#"src="poster.large""#));
        assert!(html.contains("<h1>Fullmetal Alchemist: Brotherhood (鋼の錬金術師)</h1>"));
        assert!(html.contains("Score: 9.1 | Episodes: 64 | Type: TV"));
        assert!(html.contains(
            r#"<span class="genre-badge">Action</span> <span class="genre-badge">Adventure</span>"#
        ));
        assert!(html.contains("<strong>Studios:</strong> Bones"));
        assert!(html.contains("<strong>Producers:</strong> Aniplex, Square Enix"));
        assert!(html.contains("<strong>Synopsis:</strong> Two brothers."));
        assert!(html.contains("<iframe"));
    }

    #[test]
    fn test_anime_detail_sparse_record() {
        let html = anime_detail(&MediaRecord::default()).unwrap();
        assert!(html.contains("<h1>Unknown</h1>"));
        assert!(html.contains("Score: N/A | Episodes: TBA | Type: N/A"));
        assert!(html.contains("<strong>Studios:</strong> N/A"));
        assert!(html.contains("<strong>Producers:</strong> N/A"));
        assert!(html.contains(NO_SYNOPSIS));
        assert!(!html.contains("iframe"));
        assert!(!html.contains("genre-badge"));
    }

    #[test]
    fn test_manga_detail_placeholders() {
        let html = manga_detail(&MediaRecord::default()).unwrap();
        for label in ["Type", "Chapters", "Volumes", "Score", "Status", "Published"] {
            assert!(html.contains(&format!("<strong>{label}:</strong> N/A")), "{label}");
        }
        assert!(html.contains(NO_SYNOPSIS));
    }

    #[test]
    fn test_character_with_japanese_voice_actor() {
        let record = CharacterRecord {
            character: Some(Person {
                name: Some("Elric, Edward".to_string()),
                images: images("edward"),
                ..Default::default()
            }),
            role: Some("Main".to_string()),
            voice_actors: vec![
                VoiceActor {
                    person: Some(Person {
                        name: Some("Mitchell, Vic".to_string()),
                        ..Default::default()
                    }),
                    language: Some("English".to_string()),
                },
                VoiceActor {
                    person: Some(Person {
                        name: Some("Park, Romi".to_string()),
                        images: images("romi"),
                        ..Default::default()
                    }),
                    language: Some("Japanese".to_string()),
                },
            ],
        };

        let html = character_card(&record).unwrap();
        assert!(html.contains("<h4>Elric, Edward</h4>"));
        assert!(html.contains("<p>Main</p>"));
        assert!(html.contains("<strong>Park, Romi</strong>"));
        assert!(html.contains(r#"src="romi""#));
        assert!(!html.contains("Mitchell"));
        assert!(!html.contains(NO_VOICE_ACTOR));
    }

    #[test]
    fn test_character_without_japanese_voice_actor() {
        let record = CharacterRecord {
            character: Some(Person {
                name: Some("Hughes, Maes".to_string()),
                ..Default::default()
            }),
            role: Some("Supporting".to_string()),
            voice_actors: vec![VoiceActor {
                person: Some(Person {
                    name: Some("Someone".to_string()),
                    ..Default::default()
                }),
                language: Some("German".to_string()),
            }],
        };

        let html = character_card(&record).unwrap();
        assert!(html.contains("<h4>Hughes, Maes</h4>"));
        assert!(html.contains("<p>Supporting</p>"));
        assert!(html.contains(NO_VOICE_ACTOR));
        assert!(!html.contains("(Japanese)"));

        let bare = character_card(&CharacterRecord::default()).unwrap();
        assert!(bare.contains("<h4>Unknown</h4>"));
        assert!(bare.contains(NO_VOICE_ACTOR));
    }

    #[test]
    fn test_message_tones() {
        assert_eq!(
            message("Failed to load anime for 1999", Tone::Error).unwrap(),
            r#"<p style="color:red;">Failed to load anime for 1999</p>"#
        );
        assert_eq!(
            message("Loading...", Tone::Plain).unwrap(),
            "<p>Loading...</p>"
        );
        assert_eq!(text("Top Slice & Dice Anime").unwrap(), "Top Slice &amp; Dice Anime");
    }
}
