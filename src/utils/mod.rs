use url::Url;

/// Format a duration in seconds the way the UI displays it:
/// `H:MM:SS` from one hour up, `M:SS` below, `Unknown` when absent or zero.
pub fn format_duration(seconds: Option<u64>) -> String {
    let seconds = match seconds {
        Some(s) if s > 0 => s,
        _ => return "Unknown".to_string(),
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Check that a URL points at a single YouTube video:
/// `youtube.com/watch?v=...` (with or without `www.`) or `youtu.be/<id>`.
pub fn is_valid_youtube_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    match parsed.host_str() {
        Some("youtube.com") | Some("www.youtube.com") => {
            parsed.path() == "/watch"
                && parsed
                    .query_pairs()
                    .any(|(key, value)| key == "v" && !value.is_empty())
        }
        Some("youtu.be") => parsed.path().len() > 1,
        _ => false,
    }
}

/// Strip characters that are unsafe in a suggested save filename.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed.to_string()
    }
}
