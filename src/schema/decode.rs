//! Byte-level input boundary
//!
//! Uploaded files arrive as raw bytes. Most exports are UTF-8, but some older
//! Android builds wrote latin-1, so decoding falls back byte-for-byte.

const UTF8_BOM: char = '\u{feff}';

/// Decode raw bytes into document text: UTF-8 first, latin-1 otherwise
pub fn decode_document(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!(len = bytes.len(), "document is not UTF-8, decoding as latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    };
    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Whether an uploaded or archived file name is a session document
///
/// Skips macOS metadata: `__MACOSX/` folders and `._` resource forks.
pub fn is_session_document_name(name: &str) -> bool {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    name.to_ascii_lowercase().ends_with(".json")
        && !name.contains("__MACOSX")
        && !base.starts_with("._")
}

/// Decode every named entry that looks like a session document, in order
pub fn collect_documents<I, N, B>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = (N, B)>,
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    entries
        .into_iter()
        .filter(|(name, _)| {
            let name: &str = name.as_ref();
            let keep = is_session_document_name(name);
            if !keep {
                tracing::trace!(name, "skipping non-document entry");
            }
            keep
        })
        .map(|(_, bytes)| decode_document(bytes.as_ref()))
        .collect()
}
