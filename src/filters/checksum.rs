//! `! Checksum: <token>` verification for downloaded filter lists.
//!
//! The token is the unpadded base64 of the MD5 digest of the normalized
//! document. The algorithm is fixed by the filter server.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BuildError, Result};

static CHECKSUM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*![ \t]*checksum[ \t\-:]+([A-Za-z0-9+/=]+)[^\n]*(?:\n|$)")
        .expect("checksum pattern compiles")
});

static NEWLINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n+").expect("newline pattern compiles"));

/// Token declared by the first checksum comment, if any.
pub fn declared_checksum(text: &str) -> Option<&str> {
    CHECKSUM_LINE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn normalize(text: &str) -> String {
    let text = text.replace('\r', "");
    let text = NEWLINE_RUNS.replace_all(&text, "\n");
    CHECKSUM_LINE.replace(&text, "").into_owned()
}

/// Checksum of `text`, ignoring any checksum comment it already carries.
pub fn calculate_checksum(text: &str) -> String {
    let digest = Md5::digest(normalize(text).as_bytes());
    STANDARD_NO_PAD.encode(digest)
}

/// Prepends a `! Checksum:` comment for `text`.
pub fn add_checksum(text: &str) -> String {
    // Newline runs collapse before the comment is stripped, so hash the
    // document as it will look with the comment in place.
    let token = calculate_checksum(&format!("! Checksum: x\n{text}"));
    format!("! Checksum: {token}\n{text}")
}

/// Fails with an integrity error unless `text` carries a matching checksum.
/// `url` only feeds the error message.
pub fn validate_checksum(url: &str, text: &str) -> Result<()> {
    let declared = declared_checksum(text).ok_or_else(|| BuildError::MissingChecksum {
        url: url.to_string(),
    })?;
    let expected = calculate_checksum(text);
    if declared.trim_end_matches('=') != expected {
        return Err(BuildError::ChecksumMismatch {
            url: url.to_string(),
            declared: declared.to_string(),
            expected,
        });
    }
    Ok(())
}
