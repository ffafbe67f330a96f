use url::Url;

/// MIME type used when neither the record nor the URL says otherwise
pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Pick the enclosure MIME type for an episode
///
/// A non-blank stored type wins; otherwise the type is inferred from the
/// file extension of the enclosure URL, defaulting to MP3.
pub fn enclosure_mime_type(stored: Option<&str>, url: &Url) -> String {
    if let Some(mime) = stored.map(str::trim).filter(|m| m.contains('/')) {
        return mime.to_lowercase();
    }

    audio_extension(url)
        .and_then(|ext| extension_to_mime(&ext))
        .unwrap_or(DEFAULT_AUDIO_MIME)
        .to_string()
}

/// Extract the file extension from the last path segment of a URL
fn audio_extension(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|filename| filename.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
}

/// Map audio file extensions to the MIME types podcast directories expect
fn extension_to_mime(ext: &str) -> Option<&'static str> {
    match ext {
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/x-m4a"),
        "mp4" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "ogg" | "oga" => Some("audio/ogg"),
        "opus" => Some("audio/opus"),
        "wav" => Some("audio/wav"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}
