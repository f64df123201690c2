//! Video link helpers for the clue player.

use std::sync::LazyLock;

use regex::Regex;

static DRIVE_FILE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\w]{25,}").expect("drive file id pattern is valid"));

/// Turn a Google Drive sharing link into its embeddable preview URL.
/// Any other URL is returned unchanged.
pub fn embed_video_url(url: &str) -> String {
    let url = url.trim();
    if !is_google_drive(url) {
        return url.to_owned();
    }

    match DRIVE_FILE_ID.find(url) {
        Some(file_id) => format!(
            "https://drive.google.com/file/d/{}/preview",
            file_id.as_str()
        ),
        None => url.to_owned(),
    }
}

fn is_google_drive(url: &str) -> bool {
    url.contains("drive.google.com") || url.contains("docs.google.com")
}
