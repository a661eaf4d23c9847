use super::ImageResolver;

/// Resolves TMDB poster paths (`/abc.jpg`) to image CDN URLs.
#[derive(Debug, Clone)]
pub struct TmdbImageResolver {
    base_url: String,
    size: String,
}

impl TmdbImageResolver {
    pub fn new(base_url: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            size: size.into(),
        }
    }
}

impl Default for TmdbImageResolver {
    fn default() -> Self {
        Self::new("https://image.tmdb.org/t/p", "w500")
    }
}

impl ImageResolver for TmdbImageResolver {
    fn resolve(&self, poster_path: Option<&str>) -> String {
        let Some(path) = poster_path.map(str::trim).filter(|p| !p.is_empty()) else {
            return String::new();
        };
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let sep = if path.starts_with('/') { "" } else { "/" };
        format!("{}/{}{sep}{path}", self.base_url, self.size)
    }
}
