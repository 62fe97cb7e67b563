// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MIME-type to file-extension mapping for re-uploaded artifacts.

/// Fixed lookup of the MIME types the engine is known to report.
const KNOWN_EXTENSIONS: &[(&str, &str)] = &[
    ("video/mp4", "mp4"),
    ("video/3gpp", "3gp"),
    ("video/quicktime", "mov"),
    ("video/x-matroska", "mkv"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("audio/ogg", "ogg"),
    ("audio/mp4", "m4a"),
    ("audio/mpeg", "mp3"),
];

/// Maps a reported MIME type to a file extension.
///
/// Falls back to the subtype portion of the MIME string, then to a generic
/// binary extension when the string is unparseable.
pub fn extension_for_mime(mime_type: &str) -> String {
    // Parameters ("audio/ogg; codecs=opus") are not part of the type.
    let essence = mime_type.split(';').next().unwrap_or("").trim();

    for (known, ext) in KNOWN_EXTENSIONS {
        if essence.eq_ignore_ascii_case(known) {
            return (*ext).to_string();
        }
    }

    let subtype = essence.split('/').nth(1).unwrap_or("").trim();
    if !subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return subtype.to_ascii_lowercase();
    }

    "bin".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mimes_use_the_fixed_table() {
        assert_eq!(extension_for_mime("video/mp4"), "mp4");
        assert_eq!(extension_for_mime("video/3gpp"), "3gp");
        assert_eq!(extension_for_mime("video/quicktime"), "mov");
        assert_eq!(extension_for_mime("video/x-matroska"), "mkv");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("audio/mpeg"), "mp3");
    }

    #[test]
    fn parameters_are_ignored() {
        assert_eq!(extension_for_mime("audio/ogg; codecs=opus"), "ogg");
        assert_eq!(extension_for_mime("IMAGE/PNG"), "png");
    }

    #[test]
    fn unknown_mime_falls_back_to_subtype() {
        assert_eq!(extension_for_mime("image/avif"), "avif");
        assert_eq!(extension_for_mime("application/zip"), "zip");
    }

    #[test]
    fn unparseable_mime_falls_back_to_bin() {
        assert_eq!(extension_for_mime(""), "bin");
        assert_eq!(extension_for_mime("garbage"), "bin");
        assert_eq!(extension_for_mime("image/"), "bin");
        assert_eq!(extension_for_mime("a/b c d!"), "bin");
    }
}
