//! Video records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{Document, Fields, Value};

/// Identifier of a video document.
///
/// Quiz questions refer to their owning video through this type. The store
/// does not enforce the reference; it is only upheld when a video is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<VideoId> for Value {
    fn from(id: VideoId) -> Self {
        Value::String(id.0)
    }
}

/// A catalog entry with playable content and descriptive text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    /// Store-assigned identifier
    pub id: VideoId,
    pub title: String,
    /// Embeddable playback URL
    pub video_url: String,
    pub description: String,
}

impl Video {
    /// Field names as stored in the `videos` collection
    pub const TITLE: &'static str = "title";
    pub const VIDEO_URL: &'static str = "video_url";
    pub const DESCRIPTION: &'static str = "description";

    /// Build a video from a stored document; missing fields read as empty
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: VideoId::new(doc.id.clone()),
            title: doc.text(Self::TITLE),
            video_url: doc.text(Self::VIDEO_URL),
            description: doc.text(Self::DESCRIPTION),
        }
    }

    /// Encode the editable fields for the store
    pub fn fields(title: &str, video_url: &str, description: &str) -> Fields {
        Fields::from([
            (Self::TITLE.to_string(), Value::from(title)),
            (Self::VIDEO_URL.to_string(), Value::from(video_url)),
            (Self::DESCRIPTION.to_string(), Value::from(description)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_document_defaults_missing_fields() {
        let doc = Document { id: "v1".into(), fields: Fields::from([("title".into(), "Intro".into())]) };
        let video = Video::from_document(&doc);

        assert_eq!(
            video,
            Video {
                id: VideoId::new("v1"),
                title: "Intro".into(),
                video_url: String::new(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn fields_use_store_names() {
        let fields = Video::fields("Intro", "https://example.com/embed/1", "Basics");
        assert_eq!(fields["video_url"], Value::from("https://example.com/embed/1"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn video_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&VideoId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
