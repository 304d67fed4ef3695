use std::time::Duration;

use reel_core::{MediaSource, is_stream_host};
use url::Url;

const VIDEO_ID_LEN: usize = 32;
const CUSTOMER_PREFIX: &str = "customer-";
const STREAM_DOMAIN_SUFFIX: &str = ".cloudflarestream.com";
const DEFAULT_WIDTH: u32 = 1280;

/// Capture point and size of a requested thumbnail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub time: Duration,
    pub width: u32,
}

impl Default for ThumbnailRequest {
    fn default() -> Self {
        Self {
            time: Duration::ZERO,
            width: DEFAULT_WIDTH,
        }
    }
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Extract the 32-hex video id from a raw id or any stream-host URL of the
/// form `https://<host>/<id>/...`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if is_video_id(trimmed) {
        return Some(trimmed.to_string());
    }

    let url = Url::parse(trimmed).ok()?;
    if !url.host_str().is_some_and(is_stream_host) {
        return None;
    }

    let mut segments = url.path_segments()?;
    let id = segments.next()?;
    // Something (possibly an empty trailing segment) has to follow the id.
    segments.next()?;
    is_video_id(id).then(|| id.to_string())
}

/// Extract the namespace from a `customer-<ns>.cloudflarestream.com` host.
pub fn extract_customer(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;
    let customer = host
        .strip_suffix(STREAM_DOMAIN_SUFFIX)?
        .strip_prefix(CUSTOMER_PREFIX)?;
    (!customer.is_empty() && !customer.contains('.')).then(|| customer.to_string())
}

fn format_time(time: Duration) -> String {
    format!("{}s", time.as_secs_f64())
}

/// Builds poster URLs for streaming sources.
///
/// A raw video id carries no namespace, so it only resolves when a default
/// customer namespace is configured.
#[derive(Clone, Debug, Default)]
pub struct ThumbnailResolver {
    default_customer: Option<String>,
}

impl ThumbnailResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default_customer(mut self, customer: impl Into<String>) -> Self {
        self.default_customer = Some(customer.into());
        self
    }

    /// Poster for a media source; `None` unless it is an adaptive source on
    /// the streaming host.
    pub fn resolve(&self, source: &MediaSource, request: ThumbnailRequest) -> Option<Url> {
        if !source.is_adaptive() {
            return None;
        }
        self.resolve_str(source.url(), request)
    }

    /// Poster for a raw id or stream-host URL.
    pub fn resolve_str(&self, input: &str, request: ThumbnailRequest) -> Option<Url> {
        let id = extract_video_id(input)?;
        let customer = extract_customer(input).or_else(|| self.default_customer.clone())?;

        let mut url = Url::parse(&format!(
            "https://{CUSTOMER_PREFIX}{customer}{STREAM_DOMAIN_SUFFIX}/{id}/thumbnails/thumbnail.jpg"
        ))
        .ok()?;
        url.query_pairs_mut()
            .append_pair("time", &format_time(request.time))
            .append_pair("width", &request.width.to_string());
        Some(url)
    }
}
