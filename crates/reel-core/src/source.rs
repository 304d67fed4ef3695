//! Media source detection from URL shape.

use std::{fmt, str::FromStr};

use url::Url;

use crate::error::{CoreError, CoreResult};

const STREAM_HOST: &str = "cloudflarestream.com";

/// Returns `true` for the streaming CDN host and its customer subdomains.
pub fn is_stream_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == STREAM_HOST
        || host
            .strip_suffix(STREAM_HOST)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// How a source has to be played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Segmented manifest; needs an adaptive engine or native support.
    Adaptive,
    /// Progressive file the playback element can load directly.
    Direct,
}

impl SourceKind {
    /// Detect the kind from a URL string.
    ///
    /// - path ending with `.m3u8` -> adaptive
    /// - streaming CDN host with a `/manifest/` path segment -> adaptive
    /// - everything else (including relative paths) -> direct
    pub fn detect(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) => Self::from_url(&url),
            Err(_) => Self::from_relative(input),
        }
    }

    fn from_url(url: &Url) -> Self {
        let path = url.path().to_ascii_lowercase();
        if path.ends_with(".m3u8") {
            return Self::Adaptive;
        }

        let on_stream_host = url.host_str().is_some_and(is_stream_host);
        if on_stream_host && path.contains("/manifest/") {
            Self::Adaptive
        } else {
            Self::Direct
        }
    }

    fn from_relative(input: &str) -> Self {
        let path = input.split(['?', '#']).next().unwrap_or(input);
        if path.to_ascii_lowercase().ends_with(".m3u8") {
            Self::Adaptive
        } else {
            Self::Direct
        }
    }
}

/// A media URL together with its detected [`SourceKind`].
///
/// Immutable; a controller replaces its source wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaSource {
    url: String,
    kind: SourceKind,
}

impl MediaSource {
    /// Create a source from an absolute URL or a site-relative path.
    pub fn new(input: impl AsRef<str>) -> CoreResult<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptySource);
        }

        Ok(Self {
            kind: SourceKind::detect(trimmed),
            url: trimmed.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_adaptive(&self) -> bool {
        self.kind == SourceKind::Adaptive
    }
}

impl FromStr for MediaSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
