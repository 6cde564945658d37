//! Video conferencing for live sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProviderError, ProviderResult};
use crate::crypto::random_bytes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSessionDetails {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub host_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSession {
    pub join_url: String,
    pub start_url: String,
    pub meeting_id: String,
}

#[trait_variant::make(VideoProvider: Send)]
pub trait LocalVideoProvider {
    fn name(&self) -> &'static str;

    async fn create_session(&self, details: &VideoSessionDetails) -> ProviderResult<VideoSession>;
}

fn validate(details: &VideoSessionDetails) -> ProviderResult<()> {
    if details.title.trim().is_empty() {
        return Err(ProviderError::Rejected {
            provider: "video",
            message: "title is required".to_string(),
        });
    }
    if details.duration_minutes == 0 {
        return Err(ProviderError::Rejected {
            provider: "video",
            message: "duration must be positive".to_string(),
        });
    }
    Ok(())
}

/// Jitsi rooms need no API call: the room exists once someone joins its URL.
#[derive(Debug, Clone)]
pub struct JitsiProvider {
    domain: String,
}

impl JitsiProvider {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().trim_end_matches('/').to_string(),
        }
    }

    fn room_name(title: &str) -> String {
        let slug: String = title
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{}-{}", slug, hex::encode(random_bytes(6)))
    }
}

impl Default for JitsiProvider {
    fn default() -> Self {
        Self::new("https://meet.jit.si")
    }
}

impl VideoProvider for JitsiProvider {
    fn name(&self) -> &'static str {
        "jitsi"
    }

    async fn create_session(&self, details: &VideoSessionDetails) -> ProviderResult<VideoSession> {
        validate(details)?;
        let room = Self::room_name(&details.title);
        let join_url = format!("{}/{}", self.domain, room);

        Ok(VideoSession {
            start_url: format!("{join_url}#config.startWithAudioMuted=false"),
            join_url,
            meeting_id: room,
        })
    }
}

/// Placeholder until Zoom credentials are wired in
#[derive(Debug, Clone, Default)]
pub struct StubZoomProvider;

impl VideoProvider for StubZoomProvider {
    fn name(&self) -> &'static str {
        "zoom"
    }

    async fn create_session(&self, details: &VideoSessionDetails) -> ProviderResult<VideoSession> {
        validate(details)?;
        let meeting_id = (rand::random::<u64>() % 9_000_000_000 + 1_000_000_000).to_string();

        tracing::warn!(meeting_id = %meeting_id, "Zoom provider is a stub; links are not real");
        Ok(VideoSession {
            join_url: format!("https://zoom.us/j/{meeting_id}"),
            start_url: format!("https://zoom.us/s/{meeting_id}"),
            meeting_id,
        })
    }
}

/// Placeholder until Google Calendar credentials are wired in
#[derive(Debug, Clone, Default)]
pub struct StubGoogleMeetProvider;

impl VideoProvider for StubGoogleMeetProvider {
    fn name(&self) -> &'static str {
        "google_meet"
    }

    async fn create_session(&self, details: &VideoSessionDetails) -> ProviderResult<VideoSession> {
        validate(details)?;
        let code: String = random_bytes(10)
            .iter()
            .map(|b| (b'a' + b % 26) as char)
            .collect();
        let meeting_id = format!("{}-{}-{}", &code[..3], &code[3..7], &code[7..]);

        tracing::warn!(meeting_id = %meeting_id, "Google Meet provider is a stub; links are not real");
        let url = format!("https://meet.google.com/{meeting_id}");
        Ok(VideoSession {
            join_url: url.clone(),
            start_url: url,
            meeting_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        JitsiProvider, ProviderError, StubGoogleMeetProvider, StubZoomProvider, VideoProvider,
        VideoSessionDetails,
    };
    use chrono::Utc;

    fn details(title: &str) -> VideoSessionDetails {
        VideoSessionDetails {
            title: title.to_string(),
            start_time: Utc::now(),
            duration_minutes: 60,
            host_email: "instructor@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_jitsi_builds_room_url() {
        let provider = JitsiProvider::new("https://meet.example.org/");
        let session = provider
            .create_session(&details("Rust Basics: Week 2!"))
            .await
            .unwrap();

        assert!(session.meeting_id.starts_with("Rust-Basics-Week-2-"));
        assert_eq!(
            session.join_url,
            format!("https://meet.example.org/{}", session.meeting_id)
        );
        assert!(session.start_url.starts_with(&session.join_url));
    }

    #[tokio::test]
    async fn test_stub_providers_produce_links() {
        let zoom = StubZoomProvider.create_session(&details("Office hours")).await.unwrap();
        assert_eq!(zoom.meeting_id.len(), 10);
        assert!(zoom.join_url.ends_with(&zoom.meeting_id));

        let meet = StubGoogleMeetProvider
            .create_session(&details("Office hours"))
            .await
            .unwrap();
        assert_eq!(meet.meeting_id.len(), 12);
        assert!(meet.join_url.starts_with("https://meet.google.com/"));
    }

    #[tokio::test]
    async fn test_rejects_zero_duration() {
        let mut d = details("Demo");
        d.duration_minutes = 0;
        assert!(matches!(
            JitsiProvider::default().create_session(&d).await,
            Err(ProviderError::Rejected { .. })
        ));
    }
}
