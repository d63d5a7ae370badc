//! Torrent identifier normalization

use percent_encoding::percent_decode_str;

const MAGNET_PREFIX: &str = "magnet:";
const ENCODED_MAGNET_MARKER: &str = "magnet%3A";
const BTIH_MARKER: &str = "urn:btih:";

/// Turn a raw identifier taken from the request path into a magnet URI.
///
/// - `magnet:...` passes through unchanged
/// - anything containing `magnet%3A` is percent-decoded
/// - anything else is treated as a bare infohash
pub fn normalize_identifier(raw: &str) -> String {
    if raw.starts_with(MAGNET_PREFIX) {
        raw.to_string()
    } else if raw.contains(ENCODED_MAGNET_MARKER) {
        percent_decode_str(raw).decode_utf8_lossy().into_owned()
    } else {
        format!("magnet:?xt=urn:btih:{}", raw)
    }
}

/// Extract the infohash from a magnet URI.
///
/// Accepts the 40-character hex form or the 32-character base32 form
/// following `urn:btih:` (matched case-insensitively). Returned lowercased.
pub fn extract_infohash(magnet: &str) -> Option<String> {
    let lowered = magnet.to_ascii_lowercase();

    lowered.match_indices(BTIH_MARKER).find_map(|(idx, _)| {
        let candidate: String = lowered[idx + BTIH_MARKER.len()..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();

        if candidate.len() >= 40 && candidate[..40].chars().all(|c| c.is_ascii_hexdigit()) {
            Some(candidate[..40].to_string())
        } else if candidate.len() >= 32 {
            Some(candidate[..32].to_string())
        } else {
            None
        }
    })
}
