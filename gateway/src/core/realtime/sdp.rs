//! SDP offer sanitation.
//!
//! The relay never parses SDP. It only undoes transport damage (stray wrapping
//! quotes, bare `\n` line endings) and checks for an audio media section.

use serde_json::Value;

/// Media section marker an offer must carry to be forwarded.
pub const AUDIO_MEDIA_MARKER: &str = "m=audio";

/// Sanitize an offer received as an arbitrary JSON value.
///
/// Anything other than a JSON string yields an empty string, which callers
/// treat as an invalid offer.
pub fn sanitize_sdp(input: &Value) -> String {
    match input {
        Value::String(raw) => sanitize_sdp_str(raw),
        _ => String::new(),
    }
}

/// Strip leading/trailing runs of `"` and normalize line endings to CRLF.
///
/// Interior quotes are left untouched.
pub fn sanitize_sdp_str(raw: &str) -> String {
    let unquoted = raw.trim_matches('"');
    let mut out = String::with_capacity(unquoted.len() + 16);
    for line in unquoted.split_inclusive('\n') {
        match line.strip_suffix('\n') {
            Some(body) => {
                out.push_str(body.strip_suffix('\r').unwrap_or(body));
                out.push_str("\r\n");
            }
            None => out.push_str(line),
        }
    }
    out
}

/// Check whether the offer declares an audio media section.
#[inline]
pub fn has_audio_section(sdp: &str) -> bool {
    sdp.contains(AUDIO_MEDIA_MARKER)
}
