//! Metadata descriptor text.

use std::path::Path;
use tracing::warn;

/// Prolog encodings read byte-for-byte as code points.
const LATIN1_LABELS: &[&str] = &["iso-8859-1", "iso8859-1", "latin1", "latin-1"];

/// Read the descriptor at `path` as text.
///
/// Published descriptors are not always UTF-8. A Latin-1 declaration in the
/// XML prolog is honored exactly; anything else that is not valid UTF-8 is
/// decoded with replacement characters rather than rejected.
pub async fn read_metadata(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(decode_metadata(bytes))
}

pub fn decode_metadata(bytes: Vec<u8>) -> String {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return text,
        Err(e) => e.into_bytes(),
    };

    match declared_encoding(&bytes) {
        Some(label) if LATIN1_LABELS.contains(&label.to_ascii_lowercase().as_str()) => {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
        declared => {
            warn!(
                encoding = declared.as_deref().unwrap_or("unspecified"),
                "Metadata is not valid UTF-8; invalid bytes replaced"
            );
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

/// The `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == b'>')?;
    let prolog = String::from_utf8_lossy(&bytes[..end]);
    if !prolog.trim_start().starts_with("<?xml") {
        return None;
    }
    let rest = &prolog[prolog.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let value = &value[..value.find(quote)?];
    Some(value.to_string())
}
