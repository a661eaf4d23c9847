//! Media proxy rewrite rule
//!
//! Playable stream URLs (`.m3u8`) are replaced with an absolute reference to
//! the proxy endpoint, `{origin}/api/proxy-m3u8?url=..&source=..&token=..`.
//! Everything else passes through untouched.

use http::header::HOST;
use http::HeaderMap;
use std::net::IpAddr;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::playlist::{PlaylistError, RewriteRule};

pub const PROXY_M3U8_PATH: &str = "/api/proxy-m3u8";
pub const PLAYABLE_SUFFIX: &str = ".m3u8";

const FALLBACK_ORIGIN: &str = "http://localhost";

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a query parameter value.
#[must_use]
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Rewrites playable URLs to go through the media proxy.
#[derive(Debug, Clone)]
pub struct ProxyRewriter {
    origin: String,
    token: Option<String>,
}

impl ProxyRewriter {
    pub fn new(origin: impl Into<String>, token: Option<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self {
            origin,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether `url` points at a playable stream (query string ignored).
    #[must_use]
    pub fn is_playable(url: &str) -> bool {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        path.to_ascii_lowercase().ends_with(PLAYABLE_SUFFIX)
    }

    fn proxied(&self, url: &str, source_label: Option<&str>) -> String {
        let mut out = format!("{}{}?url={}", self.origin, PROXY_M3U8_PATH, encode_component(url));
        if let Some(label) = source_label.filter(|l| !l.is_empty()) {
            out.push_str("&source=");
            out.push_str(&encode_component(label));
        }
        if let Some(token) = &self.token {
            out.push_str("&token=");
            out.push_str(&encode_component(token));
        }
        out
    }
}

impl RewriteRule for ProxyRewriter {
    fn rewrite_url(&self, url: &str, source_label: Option<&str>) -> Result<String, PlaylistError> {
        if !Self::is_playable(url) {
            return Ok(url.to_string());
        }

        let parsed = url::Url::parse(url).map_err(|_| PlaylistError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PlaylistError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        Ok(self.proxied(url, source_label))
    }
}

/// Resolve the scheme+host used for proxied references.
///
/// A configured site base wins. Otherwise the forwarding headers of the
/// inbound request are used, falling back to `Host`; the scheme defaults to
/// `http` only for loopback hosts.
#[must_use]
pub fn resolve_origin(site_base: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = site_base.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }

    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| first_header_value(headers, HOST.as_str()));
    let Some(host) = host else {
        return FALLBACK_ORIGIN.to_string();
    };

    let proto = first_header_value(headers, "x-forwarded-proto").unwrap_or_else(|| {
        if is_loopback_host(&host) {
            "http".to_string()
        } else {
            "https".to_string()
        }
    });

    format!("{proto}://{host}")
}

fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// `host` is a `Host` header value: a name or address with an optional port.
fn is_loopback_host(host: &str) -> bool {
    // bare IPv6 literals carry no port
    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback();
    }

    let hostname = match host.strip_prefix('[') {
        Some(rest) => rest.split(']').next().unwrap_or(rest),
        None => host.rsplit_once(':').map_or(host, |(name, _)| name),
    };
    hostname.eq_ignore_ascii_case("localhost") || hostname.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::rewrite;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_encode_component_matches_uri_component() {
        assert_eq!(encode_component("http://a/x.m3u8"), "http%3A%2F%2Fa%2Fx.m3u8");
        assert_eq!(encode_component("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("源1"), "%E6%BA%901");
    }

    #[test]
    fn test_is_playable() {
        assert!(ProxyRewriter::is_playable("http://a/x.m3u8"));
        assert!(ProxyRewriter::is_playable("http://a/X.M3U8?sign=1"));
        assert!(!ProxyRewriter::is_playable("http://a/x.mp4"));
        assert!(!ProxyRewriter::is_playable("http://a/x.m3u8.mp4"));
        assert!(!ProxyRewriter::is_playable("http://a/play?file=x.mp4"));
    }

    #[test]
    fn test_rewrites_two_episodes_with_label() {
        let rewriter = ProxyRewriter::new("https://p", None);
        let out = rewrite(
            "第01集$http://a/x.m3u8#第02集$http://a/y.m3u8",
            Some("CMS1"),
            &rewriter,
        );
        assert_eq!(
            out,
            "第01集$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fx.m3u8&source=CMS1\
             #第02集$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fy.m3u8&source=CMS1"
        );
    }

    #[test]
    fn test_token_is_appended() {
        let rewriter = ProxyRewriter::new("https://p/", Some("s3cret".to_string()));
        let out = rewriter.rewrite_url("http://a/x.m3u8", None).unwrap();
        assert_eq!(out, "https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fx.m3u8&token=s3cret");

        let empty = ProxyRewriter::new("https://p", Some(String::new()));
        assert!(!empty.rewrite_url("http://a/x.m3u8", None).unwrap().contains("token"));
    }

    #[test]
    fn test_non_playable_documents_are_unchanged() {
        let rewriter = ProxyRewriter::new("https://p", Some("t".to_string()));
        let doc = "正片$http://a/x.mp4$$$HD$http://b/y.flv$extra#预告$https://c/z";
        assert_eq!(rewrite(doc, Some("CMS1"), &rewriter), doc);
    }

    #[test]
    fn test_relative_playable_url_is_isolated() {
        let rewriter = ProxyRewriter::new("https://p", None);
        let out = rewrite("坏$index.m3u8#好$http://a/ok.m3u8", None, &rewriter);
        assert_eq!(
            out,
            "坏$index.m3u8#好$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fok.m3u8"
        );
    }

    #[test]
    fn test_extra_is_preserved_after_rewrite() {
        let rewriter = ProxyRewriter::new("https://p", None);
        let out = rewrite("EP$http://a/x.m3u8$m3u8$ext", None, &rewriter);
        assert_eq!(out, "EP$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fx.m3u8$m3u8$ext");
    }

    #[test]
    fn test_origin_prefers_site_base() {
        let h = headers(&[("host", "internal:3000")]);
        assert_eq!(resolve_origin(Some("https://tv.example.com/"), &h), "https://tv.example.com");
    }

    #[test]
    fn test_origin_from_forwarded_headers() {
        let h = headers(&[
            ("x-forwarded-host", "tv.example.com, proxy.local"),
            ("x-forwarded-proto", "https, http"),
            ("host", "internal:3000"),
        ]);
        assert_eq!(resolve_origin(None, &h), "https://tv.example.com");
    }

    #[test]
    fn test_origin_scheme_defaults() {
        assert_eq!(resolve_origin(None, &headers(&[("host", "localhost:3000")])), "http://localhost:3000");
        assert_eq!(resolve_origin(None, &headers(&[("host", "127.0.0.1:8080")])), "http://127.0.0.1:8080");
        assert_eq!(resolve_origin(None, &headers(&[("host", "[::1]:8080")])), "http://[::1]:8080");
        assert_eq!(resolve_origin(None, &headers(&[("host", "tv.example.com")])), "https://tv.example.com");
        assert_eq!(resolve_origin(Some("  "), &HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn test_loopback_detection_parses_addresses() {
        assert_eq!(
            resolve_origin(None, &headers(&[("host", "127.media.example.com")])),
            "https://127.media.example.com"
        );
        assert_eq!(resolve_origin(None, &headers(&[("host", "::1")])), "http://::1");
        assert_eq!(resolve_origin(None, &headers(&[("host", "127.0.0.2")])), "http://127.0.0.2");
        assert!(!is_loopback_host("10.0.0.1:80"));
        assert!(!is_loopback_host("[2001:db8::1]:443"));
        assert!(is_loopback_host("LOCALHOST"));
    }
}
