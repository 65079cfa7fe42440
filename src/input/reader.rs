use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};

use crate::translation::TranslationRequest;

const MAX_INPUT_SIZE: usize = 8 * 1024 * 1024; // 8MB

/// Reads the strings to translate: a JSON object of `key -> source text`.
pub struct InputReader;

impl InputReader {
    pub fn read(file_path: Option<&str>) -> Result<String> {
        file_path.map_or_else(Self::read_stdin, Self::read_file)
    }

    /// Reads and parses the input into translation requests, sorted by key.
    pub fn read_requests(file_path: Option<&str>) -> Result<Vec<TranslationRequest>> {
        let content = Self::read(file_path)?;
        parse_requests(&content)
    }

    fn read_file(path: &str) -> Result<String> {
        let metadata =
            fs::metadata(path).with_context(|| format!("Failed to access file: {path}"))?;

        let size = metadata.len() as usize;
        if size > MAX_INPUT_SIZE {
            bail!(
                "Error: Input size ({:.1} MB) exceeds maximum allowed size (8 MB).",
                size as f64 / 1024.0 / 1024.0
            );
        }

        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
    }

    #[allow(clippy::significant_drop_tightening)]
    fn read_stdin() -> Result<String> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];
        let mut stdin = io::stdin().lock();

        loop {
            let bytes_read = stdin
                .read(&mut chunk)
                .context("Failed to read from stdin")?;

            if bytes_read == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..bytes_read]);

            if buffer.len() > MAX_INPUT_SIZE {
                bail!(
                    "Error: Input size ({:.1} MB) exceeds maximum allowed size (8 MB).",
                    buffer.len() as f64 / 1024.0 / 1024.0
                );
            }
        }

        String::from_utf8(buffer).context("Input is not valid UTF-8")
    }
}

/// Parses `{"key": "source text", ...}` into requests ordered by key.
pub fn parse_requests(content: &str) -> Result<Vec<TranslationRequest>> {
    if content.trim().is_empty() {
        bail!("Error: Input is empty");
    }

    let strings: BTreeMap<String, String> = serde_json::from_str(content).context(
        "Input must be a JSON object mapping string keys to source text, e.g. {\"greeting\": \"Hello\"}",
    )?;

    Ok(strings
        .into_iter()
        .map(|(key, text)| TranslationRequest { key, text })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_read_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{{\"greeting\": \"Hello\"}}").unwrap();

        let content = InputReader::read(Some(temp_file.path().to_str().unwrap())).unwrap();
        assert_eq!(content.trim(), "{\"greeting\": \"Hello\"}");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = InputReader::read(Some("/nonexistent/path/to/strings.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_file_exceeds_max_size() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("large.json");

        fs::write(&file_path, "x".repeat(MAX_INPUT_SIZE + 1)).unwrap();

        let result = InputReader::read(Some(file_path.to_str().unwrap()));
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_read_requests_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"b": "Goodbye", "a": "こんにちは %@"}}"#).unwrap();

        let requests =
            InputReader::read_requests(Some(temp_file.path().to_str().unwrap())).unwrap();

        assert_eq!(
            requests,
            vec![
                TranslationRequest::new("a", "こんにちは %@"),
                TranslationRequest::new("b", "Goodbye"),
            ]
        );
    }

    #[test]
    fn test_parse_requests_rejects_non_object() {
        assert!(parse_requests(r#"["Hello"]"#).is_err());
        assert!(parse_requests(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_parse_requests_rejects_empty_input() {
        let error = parse_requests("  \n").unwrap_err();
        assert!(error.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_requests_keeps_empty_text() {
        let requests = parse_requests(r#"{"blank": ""}"#).unwrap();
        assert_eq!(requests, vec![TranslationRequest::new("blank", "")]);
    }
}
