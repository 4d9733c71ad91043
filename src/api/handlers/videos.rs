use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    api::state::AppState,
    error::{AppError, Result},
    integrations::{extract_video_id, VideoInfo},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct VideoInfoRequest {
    pub video_url: String,
}

/// Resolve a pasted YouTube URL (or bare id) to title, duration, and
/// thumbnail. Used by the lesson editor.
#[utoipa::path(
    post,
    path = "/api/videos/info",
    request_body = VideoInfoRequest,
    responses(
        (status = 200, body = VideoInfo),
        (status = 400, description = "URL shape not recognized"),
        (status = 404, description = "Video unknown to the metadata API")
    )
)]
pub async fn info(
    State(state): State<AppState>,
    Json(req): Json<VideoInfoRequest>,
) -> Result<Json<VideoInfo>> {
    let video_id = extract_video_id(&req.video_url)
        .ok_or_else(|| AppError::Validation("Could not parse video URL".to_string()))?;

    let client = state.youtube_client
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Video metadata lookup is not configured".to_string()))?;

    let info = client.video_info(&video_id).await?;

    Ok(Json(info))
}
