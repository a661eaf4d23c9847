//! Playlist document grammar
//!
//! ```text
//! Document := Source ("$$$" Source)*
//! Source   := Episode ("#" Episode)*
//! Episode  := URL | Title "$" URL ("$" Extra)?
//! ```
//!
//! Only the first `$` of an episode is structural. Whatever follows the URL's
//! terminating `$` is opaque and written back untouched, so `parse` followed by
//! `to_string` reproduces the input exactly.

use std::fmt;

pub const SOURCE_DELIMITER: &str = "$$$";
pub const EPISODE_DELIMITER: char = '#';
pub const FIELD_DELIMITER: char = '$';

/// Errors a rewrite rule may report for a single URL.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

/// Maps one playback URL to its replacement.
///
/// Implementations return the URL unchanged when it is not theirs to rewrite.
pub trait RewriteRule {
    fn rewrite_url(&self, url: &str, source_label: Option<&str>) -> Result<String, PlaylistError>;
}

impl<F> RewriteRule for F
where
    F: Fn(&str, Option<&str>) -> Result<String, PlaylistError>,
{
    fn rewrite_url(&self, url: &str, source_label: Option<&str>) -> Result<String, PlaylistError> {
        self(url, source_label)
    }
}

/// A parsed `vod_play_url` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub sources: Vec<Source>,
}

/// One playback source (a line of episodes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Episode {
    /// Segment without any field delimiter.
    Bare { url: String },
    /// `title$url`, optionally followed by `$extra`. `extra` excludes the
    /// leading delimiter.
    Titled {
        title: String,
        url: String,
        extra: Option<String>,
    },
}

impl Document {
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            sources: input.split(SOURCE_DELIMITER).map(Source::parse).collect(),
        }
    }

    #[must_use]
    pub fn single(source: Source) -> Self {
        Self {
            sources: vec![source],
        }
    }

    /// Run `rule` over every episode URL.
    ///
    /// An episode whose URL the rule rejects keeps its original text; the
    /// remaining episodes are still processed. Returns the number of
    /// rejected episodes.
    pub fn rewrite_urls<R>(&mut self, source_label: Option<&str>, rule: &R) -> usize
    where
        R: RewriteRule + ?Sized,
    {
        let mut failures = 0;
        for episode in self.sources.iter_mut().flat_map(|s| s.episodes.iter_mut()) {
            match rule.rewrite_url(episode.url(), source_label) {
                Ok(rewritten) => episode.set_url(rewritten),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(url = %episode.url(), error = %e, "Failed to rewrite playlist URL, keeping original");
                }
            }
        }
        failures
    }
}

impl Source {
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            episodes: input.split(EPISODE_DELIMITER).map(Episode::parse).collect(),
        }
    }

    #[must_use]
    pub fn from_episodes(episodes: impl IntoIterator<Item = Episode>) -> Self {
        Self {
            episodes: episodes.into_iter().collect(),
        }
    }
}

impl Episode {
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let Some((title, rest)) = input.split_once(FIELD_DELIMITER) else {
            return Self::Bare {
                url: input.to_string(),
            };
        };

        let (url, extra) = match rest.split_once(FIELD_DELIMITER) {
            Some((url, extra)) => (url, Some(extra.to_string())),
            None => (rest, None),
        };

        Self::Titled {
            title: title.to_string(),
            url: url.to_string(),
            extra,
        }
    }

    #[must_use]
    pub fn titled(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Titled {
            title: title.into(),
            url: url.into(),
            extra: None,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Bare { url } | Self::Titled { url, .. } => url,
        }
    }

    fn set_url(&mut self, new_url: String) {
        match self {
            Self::Bare { url } | Self::Titled { url, .. } => *url = new_url,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 {
                f.write_str(SOURCE_DELIMITER)?;
            }
            write!(f, "{source}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, episode) in self.episodes.iter().enumerate() {
            if i > 0 {
                write!(f, "{EPISODE_DELIMITER}")?;
            }
            write!(f, "{episode}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare { url } => f.write_str(url),
            Self::Titled { title, url, extra } => {
                write!(f, "{title}{FIELD_DELIMITER}{url}")?;
                if let Some(extra) = extra {
                    write!(f, "{FIELD_DELIMITER}{extra}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parse `document`, pass every episode URL through `rule`, and serialize the
/// result with the original delimiters.
pub fn rewrite<R>(document: &str, source_label: Option<&str>, rule: &R) -> String
where
    R: RewriteRule + ?Sized,
{
    let mut parsed = Document::parse(document);
    parsed.rewrite_urls(source_label, rule);
    parsed.to_string()
}
