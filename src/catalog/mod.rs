//! Public video catalog with client-side search

pub mod model;

pub use model::{Video, VideoId};

use crate::config::progress::{LearningRecords, ProgressStatus};
use crate::store::{DocumentStore, StoreError, VIDEOS};

/// Keep the videos whose title or description contains `term`, ignoring case.
///
/// An empty term keeps everything. Order is preserved.
pub fn filter<'a>(videos: &'a [Video], term: &str) -> Vec<&'a Video> {
    let term = term.to_lowercase();
    videos
        .iter()
        .filter(|video| {
            term.is_empty()
                || video.title.to_lowercase().contains(&term)
                || video.description.to_lowercase().contains(&term)
        })
        .collect()
}

/// Fetch every video in the store
pub async fn fetch_videos<S: DocumentStore>(store: &S) -> Result<Vec<Video>, StoreError> {
    Ok(store.list(VIDEOS).await?.iter().map(Video::from_document).collect())
}

/// A video as displayed in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry<'a> {
    pub video: &'a Video,
    pub status: ProgressStatus,
}

/// The catalog view: all videos, fetched once
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    videos: Vec<Video>,
}

impl Catalog {
    pub fn new(videos: Vec<Video>) -> Self {
        Self { videos }
    }

    /// Fetch the catalog from the store
    pub async fn load<S: DocumentStore>(store: &S) -> Result<Self, StoreError> {
        let videos = fetch_videos(store).await?;
        tracing::info!("catalog loaded with {} videos", videos.len());
        Ok(Self { videos })
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    /// Matching videos overlaid with their local progress
    pub fn search<'a>(&'a self, term: &str, records: &LearningRecords) -> Vec<CatalogEntry<'a>> {
        filter(&self.videos, term)
            .into_iter()
            .map(|video| CatalogEntry { video, status: records.status(&video.id) })
            .collect()
    }
}
