use async_trait::async_trait;

use crate::error::Result;

pub mod sms;
pub mod youtube;

pub use sms::{normalize_local_phone, to_international, BulkSmsGateway, NoopSmsGateway};
pub use youtube::{extract_video_id, iso8601_duration_minutes, VideoInfo, YouTubeClient};

/// Outbound SMS dispatch. Production uses the bulk gateway; a no-op
/// implementation stands in when SMS is disabled and in tests.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    async fn health_check(&self) -> Result<()>;
    /// `phone` is the international (88-prefixed) form.
    async fn send(&self, phone: &str, message: &str) -> Result<()>;
}
