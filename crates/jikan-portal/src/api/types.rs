//! Jikan API v4 response types.
//!
//! Only the fields the portal renders are modelled. Every field is optional
//! so a sparse record still deserializes; renderers supply the placeholders.
//! List fields accept both an absent key and an explicit `null`.

use serde::{Deserialize, Deserializer, Serialize};

/// Read a list that the API may send as `null`
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// List wrapper used by search, top, season and character endpoints.
///
/// An absent or `null` `data` field yields an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
}

/// Single-record wrapper used by the detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse<T> {
    pub data: Option<T>,
}

/// One anime or manga title
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaRecord {
    pub mal_id: Option<u64>,
    pub title: Option<String>,
    /// Used by producer-style records that carry a name instead of a title
    pub name: Option<String>,
    pub title_japanese: Option<String>,
    pub images: Option<Images>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub score: Option<f64>,
    pub episodes: Option<u32>,
    pub chapters: Option<u32>,
    pub volumes: Option<u32>,
    pub status: Option<String>,
    pub synopsis: Option<String>,
    pub published: Option<Published>,
    pub trailer: Option<Trailer>,
    #[serde(deserialize_with = "null_as_empty")]
    pub genres: Vec<NamedEntity>,
    #[serde(deserialize_with = "null_as_empty")]
    pub studios: Vec<NamedEntity>,
    #[serde(deserialize_with = "null_as_empty")]
    pub producers: Vec<NamedEntity>,
}

impl MediaRecord {
    /// Display title, falling back to the entity name
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    /// Standard-size JPEG cover
    pub fn image_url(&self) -> Option<&str> {
        self.images.as_ref().and_then(|i| i.jpg_url())
    }

    /// Large JPEG cover, used by detail layouts
    pub fn large_image_url(&self) -> Option<&str> {
        self.images.as_ref().and_then(|i| i.jpg_large_url())
    }

    /// Trailer embed URL, if the record carries a playable one
    pub fn trailer_embed_url(&self) -> Option<&str> {
        self.trailer
            .as_ref()
            .and_then(|t| t.embed_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Image variants keyed by format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Images {
    pub jpg: Option<ImageSet>,
    pub webp: Option<ImageSet>,
}

impl Images {
    pub fn jpg_url(&self) -> Option<&str> {
        self.jpg.as_ref().and_then(|s| s.image_url.as_deref())
    }

    pub fn jpg_large_url(&self) -> Option<&str> {
        self.jpg
            .as_ref()
            .and_then(|s| s.large_image_url.as_deref().or(s.image_url.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trailer {
    pub youtube_id: Option<String>,
    pub url: Option<String>,
    pub embed_url: Option<String>,
}

/// Manga publication range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Published {
    pub from: Option<String>,
    pub to: Option<String>,
    pub string: Option<String>,
}

/// MAL entity (genre, studio, producer)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedEntity {
    pub mal_id: Option<u64>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub name: Option<String>,
}

/// One entry of `/anime/{id}/characters`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRecord {
    pub character: Option<Person>,
    pub role: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub voice_actors: Vec<VoiceActor>,
}

impl CharacterRecord {
    /// First voice actor credited for the Japanese dub
    pub fn japanese_voice_actor(&self) -> Option<&VoiceActor> {
        self.voice_actors
            .iter()
            .find(|va| va.language.as_deref() == Some("Japanese"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceActor {
    pub person: Option<Person>,
    pub language: Option<String>,
}

/// Character or person sub-object; both share the same shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub mal_id: Option<u64>,
    pub name: Option<String>,
    pub images: Option<Images>,
}

impl Person {
    pub fn image_url(&self) -> Option<&str> {
        self.images.as_ref().and_then(|i| i.jpg_url())
    }
}
