// SPDX-License-Identifier: MPL-2.0

//! `data:<mime>;base64,<payload>` encoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::pipelines::photo::encoding::guess_mime;

/// MIME type assumed when neither the URI nor the bytes say otherwise
const FALLBACK_MIME: &str = "application/octet-stream";

/// Image bytes recovered from a data URI or bare base64 string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension matching the MIME subtype (`image/png` → `png`)
    pub fn extension(&self) -> &str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            other => other
                .split_once('/')
                .map(|(_, subtype)| subtype)
                .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
                .unwrap_or("bin"),
        }
    }
}

/// Encode bytes as a base64 data URI
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Parse a base64 data URI, or a bare base64 string
///
/// Bare payloads get their MIME type sniffed from the decoded bytes.
pub fn parse_data_uri(input: &str) -> Result<DecodedImage, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty payload".to_string());
    }

    let (declared_mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| "data URI has no payload separator".to_string())?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| "only base64 data URIs are supported".to_string())?;
            (Some(mime.to_ascii_lowercase()), payload)
        }
        None => (None, input),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64: {}", e))?;
    if bytes.is_empty() {
        return Err("empty payload".to_string());
    }

    let mime = declared_mime
        .filter(|m| !m.is_empty())
        .or_else(|| guess_mime(&bytes).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_MIME.to_string());

    Ok(DecodedImage { mime, bytes })
}
