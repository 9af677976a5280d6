//! Document Reader
//!
//! Loads an ALPS document from disk and decodes it by trying an ordered list
//! of candidate encodings. Line endings are normalized to `\n` so Windows
//! and classic Mac files split the same way as Unix ones.

use std::path::Path;
use tracing::{debug, info, warn};

use alps_core::{AlpsError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Extensions that are expected for ALPS documents
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Candidate text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 without a byte-order mark
    Utf8,
    /// UTF-8 with an optional leading byte-order mark, which is stripped
    Utf8Bom,
    /// ISO-8859-1: every byte maps to the code point of the same value
    Latin1,
    /// Windows-1252 (WHATWG mapping)
    Windows1252,
}

impl TextEncoding {
    /// Default candidates, in the order they are tried
    pub const DEFAULT_ORDER: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Utf8Bom,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Bom => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode without replacement; `None` means the bytes are not valid in
    /// this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return None;
                }
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Utf8Bom => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Text of a successfully decoded document
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    /// Source identifier (the path as given)
    pub source: String,
    /// Decoded text
    pub text: String,
    /// Encoding that succeeded
    pub encoding: TextEncoding,
}

impl DecodedDocument {
    /// Number of characters (Unicode scalar values) in the text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Reads ALPS documents with encoding recovery
#[derive(Debug, Clone)]
pub struct DocumentReader {
    encodings: Vec<TextEncoding>,
}

impl DocumentReader {
    pub fn new() -> Self {
        Self {
            encodings: TextEncoding::DEFAULT_ORDER.to_vec(),
        }
    }

    /// Replace the candidate encodings
    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn encodings(&self) -> &[TextEncoding] {
        &self.encodings
    }

    /// Read and decode the document at `path`
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<DecodedDocument> {
        let path = path.as_ref();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AlpsError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(AlpsError::Io(e)),
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !MARKDOWN_EXTENSIONS.contains(&extension.as_str()) {
            warn!(
                path = %path.display(),
                extension = %extension,
                "File extension may not be a markdown file"
            );
        }

        let document = self.decode(path, &bytes)?;

        info!(
            path = %path.display(),
            encoding = %document.encoding,
            characters = document.char_count(),
            "Read ALPS document"
        );

        Ok(document)
    }

    /// Decode raw bytes, trying each candidate encoding in order
    pub fn decode(&self, path: &Path, bytes: &[u8]) -> Result<DecodedDocument> {
        let mut decoded = None;

        for encoding in &self.encodings {
            match encoding.decode(bytes) {
                Some(text) => {
                    decoded = Some((text, *encoding));
                    break;
                }
                None => {
                    debug!(encoding = %encoding, "Candidate encoding rejected");
                }
            }
        }

        let (text, encoding) = decoded.ok_or_else(|| AlpsError::Decode {
            path: path.to_path_buf(),
            tried: self
                .encodings
                .iter()
                .map(TextEncoding::name)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        let text = normalize_line_endings(text);

        if text.trim().is_empty() {
            return Err(AlpsError::EmptyDocument {
                path: path.to_path_buf(),
            });
        }

        Ok(DecodedDocument {
            source: path.display().to_string(),
            text,
            encoding,
        })
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`
fn normalize_line_endings(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[tokio::test]
    async fn test_read_utf8() {
        let file = write_temp(".md", "# Título\n\nBody".as_bytes());
        let doc = DocumentReader::new().read(file.path()).await.unwrap();

        assert_eq!(doc.text, "# Título\n\nBody");
        assert_eq!(doc.encoding, TextEncoding::Utf8);
        assert_eq!(doc.char_count(), 14);
    }

    #[tokio::test]
    async fn test_read_strips_bom() {
        let file = write_temp(".md", b"\xEF\xBB\xBF# Title");
        let doc = DocumentReader::new().read(file.path()).await.unwrap();

        assert_eq!(doc.text, "# Title");
        assert_eq!(doc.encoding, TextEncoding::Utf8Bom);
    }

    #[tokio::test]
    async fn test_read_falls_back_to_latin1() {
        // 0xE9 is 'é' in Latin-1 and invalid as standalone UTF-8
        let file = write_temp(".md", b"caf\xE9");
        let doc = DocumentReader::new().read(file.path()).await.unwrap();

        assert_eq!(doc.text, "café");
        assert_eq!(doc.encoding, TextEncoding::Latin1);
    }

    #[tokio::test]
    async fn test_read_normalizes_line_endings() {
        let file = write_temp(".md", b"A\r\n---\r\nB\rC\n");
        let doc = DocumentReader::new().read(file.path()).await.unwrap();

        assert_eq!(doc.text, "A\n---\nB\nC\n");
        assert_eq!(doc.char_count(), 10);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let err = DocumentReader::new().read(&path).await.unwrap_err();
        assert!(matches!(err, AlpsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_whitespace_only() {
        let file = write_temp(".md", b"  \n\t\n ");
        let err = DocumentReader::new().read(file.path()).await.unwrap_err();

        assert!(matches!(err, AlpsError::EmptyDocument { .. }));
    }

    #[tokio::test]
    async fn test_read_accepts_other_extensions() {
        let file = write_temp(".rst", b"content");
        let doc = DocumentReader::new().read(file.path()).await.unwrap();
        assert_eq!(doc.text, "content");
    }

    #[test]
    fn test_decode_error_when_no_candidate_fits() {
        let reader = DocumentReader::new().with_encodings(vec![TextEncoding::Utf8]);
        let err = reader.decode(Path::new("bad.md"), b"\xFF\xFE\xFD").unwrap_err();

        match err {
            AlpsError::Decode { tried, .. } => assert_eq!(tried, "utf-8"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_windows_1252_candidate() {
        // 0x93/0x94 are curly quotes in Windows-1252
        let text = TextEncoding::Windows1252.decode(b"\x93quoted\x94").unwrap();
        assert_eq!(text, "\u{201C}quoted\u{201D}");
    }

    #[test]
    fn test_utf8_candidate_rejects_bom() {
        assert!(TextEncoding::Utf8.decode(b"\xEF\xBB\xBFx").is_none());
        assert_eq!(TextEncoding::Utf8Bom.decode(b"x").as_deref(), Some("x"));
    }
}
