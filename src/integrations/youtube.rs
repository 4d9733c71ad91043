use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::YouTubeConfig,
    error::{AppError, Result},
};

const VIDEOS_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub duration_minutes: i64,
    pub thumbnail_url: Option<String>,
    pub channel_title: String,
}

pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Deserialize)]
struct ApiItem {
    snippet: ApiSnippet,
    #[serde(rename = "contentDetails")]
    content_details: ApiContentDetails,
}

#[derive(Deserialize)]
struct ApiSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: ApiThumbnails,
}

#[derive(Deserialize, Default)]
struct ApiThumbnails {
    maxres: Option<ApiThumbnail>,
    high: Option<ApiThumbnail>,
    medium: Option<ApiThumbnail>,
    default: Option<ApiThumbnail>,
}

#[derive(Deserialize)]
struct ApiThumbnail {
    url: String,
}

#[derive(Deserialize)]
struct ApiContentDetails {
    #[serde(default)]
    duration: String,
}

impl YouTubeClient {
    /// Returns None when the metadata lookup is disabled. Enabled-but-
    /// incomplete config is rejected at settings validation.
    pub fn new(config: YouTubeConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key?;

        Some(Self {
            http: reqwest::Client::new(),
            api_key,
        })
    }

    pub async fn video_info(&self, video_id: &str) -> Result<VideoInfo> {
        let response = self
            .http
            .get(VIDEOS_API_URL)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::External(format!("YouTube API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::External(format!("YouTube API returned HTTP {}", status)));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("YouTube API response unreadable: {}", e)))?;

        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

        let thumbnail_url = item
            .snippet
            .thumbnails
            .maxres
            .or(item.snippet.thumbnails.high)
            .or(item.snippet.thumbnails.medium)
            .or(item.snippet.thumbnails.default)
            .map(|t| t.url);

        Ok(VideoInfo {
            video_id: video_id.to_string(),
            title: item.snippet.title,
            description: item.snippet.description,
            duration_minutes: iso8601_duration_minutes(&item.content_details.duration),
            thumbnail_url,
            channel_title: item.snippet.channel_title,
        })
    }
}

/// Pull an 11-character video id out of the URL shapes people paste:
/// youtu.be short links, watch URLs (with extra query params), embeds,
/// shorts, or a bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    let bare = Regex::new(r"^[A-Za-z0-9_-]{11}$").ok()?;
    if bare.is_match(input) {
        return Some(input.to_string());
    }

    let patterns = [
        r"youtu\.be/([A-Za-z0-9_-]{11})",
        r"youtube\.com/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})",
        r"youtube\.com/embed/([A-Za-z0-9_-]{11})",
        r"youtube\.com/shorts/([A-Za-z0-9_-]{11})",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(captures) = re.captures(input) {
            return Some(captures[1].to_string());
        }
    }

    None
}

/// ISO-8601 duration ("PT1H2M3S") to whole minutes, rounded half-up.
/// Malformed input is treated as zero-length.
pub fn iso8601_duration_minutes(duration: &str) -> i64 {
    let re = match Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$") {
        Ok(re) => re,
        Err(_) => return 0,
    };

    let captures = match re.captures(duration.trim()) {
        Some(c) => c,
        None => return 0,
    };

    let component = |i: usize| -> i64 {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };

    let total_seconds = component(1) * 3600 + component(2) * 60 + component(3);

    (total_seconds + 30) / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_rounds_to_whole_minutes() {
        assert_eq!(iso8601_duration_minutes("PT1H2M3S"), 62);
        assert_eq!(iso8601_duration_minutes("PT45S"), 1);
        assert_eq!(iso8601_duration_minutes("PT29S"), 0);
        assert_eq!(iso8601_duration_minutes("PT10M"), 10);
        assert_eq!(iso8601_duration_minutes("PT2H"), 120);
    }

    #[test]
    fn malformed_duration_is_zero() {
        assert_eq!(iso8601_duration_minutes(""), 0);
        assert_eq!(iso8601_duration_minutes("1h2m"), 0);
        assert_eq!(iso8601_duration_minutes("PT1X"), 0);
    }

    #[test]
    fn extracts_id_from_short_links() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn extracts_id_from_watch_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc12345678&t=5").as_deref(),
            Some("abc12345678")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=PL123&v=abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn extracts_id_from_embed_and_shorts() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abc12345678").as_deref(),
            Some("abc12345678")
        );
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn bare_ids_pass_through() {
        assert_eq!(extract_video_id("abc12345678").as_deref(), Some("abc12345678"));
    }

    #[test]
    fn unrecognized_shapes_yield_nothing() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("short"), None);
    }
}
