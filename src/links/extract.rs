use url::Url;

/// Hosts serving the full YouTube site.
pub const YOUTUBE_HOSTS: [&str; 2] = ["youtube.com", "www.youtube.com"];

/// Host of the short-link service.
pub const SHORT_LINK_HOST: &str = "youtu.be";

/// Extracts the video ID from a YouTube link.
///
/// Recognized shapes:
/// - `https://www.youtube.com/watch?v=<id>` (first non-blank `v` parameter)
/// - `https://www.youtube.com/shorts/<id>` and `/embed/<id>`
/// - `https://youtu.be/<id>` (the whole path, unvalidated)
///
/// Returns `None` for anything else, including an empty ID.
///
/// # Example
///
/// ```
/// assert_eq!(
///     extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
///     Some("dQw4w9WgXcQ")
/// );
/// assert_eq!(extract_video_id("not-a-url"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let id = if YOUTUBE_HOSTS.contains(&host) {
        from_site_url(&parsed)
    } else if host == SHORT_LINK_HOST {
        Some(parsed.path().trim_start_matches('/').to_string())
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

fn from_site_url(parsed: &Url) -> Option<String> {
    let path = parsed.path();
    if path == "/watch" {
        return parsed
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
    }

    let rest = path
        .strip_prefix("/shorts/")
        .or_else(|| path.strip_prefix("/embed/"))?;
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    Some(rest[..end].to_string())
}
