use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::LibraryConfig;

/// One finished creation discovered in the media library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationItem {
    /// Topic directory name (the sanitized scene name)
    pub topic: String,
    /// Quality directory name, e.g. "720p30"
    pub quality: String,
    /// Primary video file inside the quality directory
    pub video_path: PathBuf,
    /// Creation timestamp of the quality directory
    pub created: DateTime<Utc>,
}

/// Scans the `media/videos/<topic>/<quality>/` tree for finished creations.
pub struct CreationLibrary {
    videos_dir: PathBuf,
    video_extensions: Vec<String>,
}

impl CreationLibrary {
    /// `media_dir` is the render working directory; videos live under
    /// `media/videos/` beneath it.
    pub fn new(media_dir: &Path, config: &LibraryConfig) -> Self {
        Self {
            videos_dir: media_dir.join("media").join("videos"),
            video_extensions: config.video_extensions.clone(),
        }
    }

    /// List all creations, newest first. Topic or quality directories that
    /// cannot be read are skipped, matching the tolerant scan the original
    /// history view performed.
    pub async fn scan(&self) -> Result<Vec<CreationItem>> {
        let mut creations = Vec::new();

        if !self.videos_dir.exists() {
            debug!("No library yet at {}", self.videos_dir.display());
            return Ok(creations);
        }

        let mut topics = tokio::fs::read_dir(&self.videos_dir).await?;
        while let Some(topic_entry) = topics.next_entry().await? {
            let topic_path = topic_entry.path();
            if !topic_path.is_dir() {
                continue;
            }
            let topic = topic_entry.file_name().to_string_lossy().to_string();

            let mut qualities = match tokio::fs::read_dir(&topic_path).await {
                Ok(qualities) => qualities,
                Err(e) => {
                    warn!("Skipping unreadable topic {}: {}", topic_path.display(), e);
                    continue;
                }
            };

            while let Some(quality_entry) = qualities.next_entry().await? {
                let quality_path = quality_entry.path();
                if !quality_path.is_dir() {
                    continue;
                }

                match self.primary_video(&quality_path).await {
                    Ok(Some(video_path)) => {
                        let created = directory_created(&quality_path).await;
                        creations.push(CreationItem {
                            topic: topic.clone(),
                            quality: quality_entry.file_name().to_string_lossy().to_string(),
                            video_path,
                            created,
                        });
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(
                            "Skipping unreadable quality dir {}: {}",
                            quality_path.display(),
                            e
                        );
                    }
                }
            }
        }

        creations.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(creations)
    }

    /// First file in the directory with a recognized video extension.
    async fn primary_video(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if self.video_extensions.contains(&ext.to_lowercase()) {
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }
}

async fn directory_created(path: &Path) -> DateTime<Utc> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now()),
        Err(_) => Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    async fn make_creation(media_dir: &Path, topic: &str, quality: &str, file: &str) {
        let dir = media_dir
            .join("media")
            .join("videos")
            .join(topic)
            .join(quality);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(file), b"video bytes").await.unwrap();
    }

    fn library(media_dir: &Path) -> CreationLibrary {
        CreationLibrary::new(media_dir, &Config::default().library)
    }

    #[tokio::test]
    async fn test_scan_missing_library_is_empty() {
        let temp = TempDir::new().unwrap();
        let creations = library(temp.path()).scan().await.unwrap();
        assert!(creations.is_empty());
    }

    #[tokio::test]
    async fn test_scan_finds_creations() {
        let temp = TempDir::new().unwrap();
        make_creation(temp.path(), "PythagoreanTheorem", "720p30", "NarratedScene.mp4").await;
        make_creation(temp.path(), "FourierSeries", "1080p60", "NarratedScene.mov").await;

        let creations = library(temp.path()).scan().await.unwrap();

        assert_eq!(creations.len(), 2);
        let topics: Vec<&str> = creations.iter().map(|c| c.topic.as_str()).collect();
        assert!(topics.contains(&"PythagoreanTheorem"));
        assert!(topics.contains(&"FourierSeries"));
    }

    #[tokio::test]
    async fn test_scan_skips_quality_dirs_without_videos() {
        let temp = TempDir::new().unwrap();
        make_creation(temp.path(), "Topic", "720p30", "notes.txt").await;

        let creations = library(temp.path()).scan().await.unwrap();
        assert!(creations.is_empty());
    }

    #[tokio::test]
    async fn test_scan_ignores_unrecognized_extensions_but_keeps_videos() {
        let temp = TempDir::new().unwrap();
        make_creation(temp.path(), "Topic", "480p15", "partial.log").await;
        make_creation(temp.path(), "Topic", "480p15", "NarratedScene.mkv").await;

        let creations = library(temp.path()).scan().await.unwrap();
        assert_eq!(creations.len(), 1);
        assert_eq!(creations[0].quality, "480p15");
        assert_eq!(
            creations[0].video_path.file_name().unwrap().to_str().unwrap(),
            "NarratedScene.mkv"
        );
    }
}
