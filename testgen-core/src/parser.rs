//! Requirements document parser
//!
//! Turns an uploaded plain-text document into an ordered list of
//! requirements, one per non-empty line.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Requirement, REQ_ID_PREFIX};

/// The only accepted document extension
pub const ACCEPTED_EXTENSION: &str = ".txt";

/// Titles longer than this many characters are truncated
pub const TITLE_MAX_CHARS: usize = 50;

/// Appended to truncated titles
pub const TITLE_ELLIPSIS: &str = "...";

/// UTF-8 byte-order mark, stripped like whitespace
const BOM: char = '\u{feff}';

/// Errors that can occur while loading a requirements document
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please upload a .txt file (got {})", .0.display())]
    FileFormat(PathBuf),

    #[error("Failed to process file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parses raw document text into requirements.
///
/// Lines are trimmed and blank lines dropped before numbering, so `REQ-n`
/// reflects the position among non-empty lines, not the raw line number.
pub fn parse_requirements(text: &str) -> Vec<Requirement> {
    text.split('\n')
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || c == BOM))
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| Requirement {
            req_id: format!("{}{}", REQ_ID_PREFIX, index + 1),
            title: make_title(line),
            text: line.to_string(),
        })
        .collect()
}

/// Builds the display title for a requirement line
pub fn make_title(line: &str) -> String {
    match line.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &line[..cut], TITLE_ELLIPSIS),
        None => line.to_string(),
    }
}

/// Returns true if the file name carries the accepted extension
pub fn has_accepted_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(ACCEPTED_EXTENSION))
        .unwrap_or(false)
}

/// Loads and parses a requirements document from disk.
///
/// Only the extension is checked; content is decoded lossily.
pub fn load_requirements_file<P: AsRef<Path>>(path: P) -> Result<Vec<Requirement>, UploadError> {
    let path = path.as_ref();

    if !has_accepted_extension(path) {
        return Err(UploadError::FileFormat(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| UploadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = String::from_utf8_lossy(&bytes);
    let text = decoded.strip_prefix(BOM).unwrap_or(&decoded);

    let requirements = parse_requirements(text);
    log::info!(
        "Parsed {} requirements from {}",
        requirements.len(),
        path.display()
    );
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_blank_lines_are_dropped_before_numbering() {
        let text = "\nFirst requirement\n\n   \nSecond requirement\r\n\tThird\t\n";
        let reqs = parse_requirements(text);

        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[0].req_id, "REQ-1");
        assert_eq!(reqs[0].text, "First requirement");
        assert_eq!(reqs[1].req_id, "REQ-2");
        assert_eq!(reqs[1].text, "Second requirement");
        assert_eq!(reqs[2].req_id, "REQ-3");
        assert_eq!(reqs[2].text, "Third");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_requirements("").is_empty());
        assert!(parse_requirements("\n\n  \n").is_empty());
    }

    #[test]
    fn test_ids_are_gapless() {
        let text = (0..20)
            .map(|i| if i % 3 == 0 { String::new() } else { format!("line {}", i) })
            .collect::<Vec<_>>()
            .join("\n");
        let reqs = parse_requirements(&text);

        for (i, req) in reqs.iter().enumerate() {
            assert_eq!(req.req_id, format!("REQ-{}", i + 1));
        }
    }

    #[test]
    fn test_short_title_is_text() {
        let line = "a".repeat(50);
        let reqs = parse_requirements(&line);
        assert_eq!(reqs[0].title, reqs[0].text);
    }

    #[test]
    fn test_long_title_is_truncated() {
        let line = "b".repeat(51);
        let reqs = parse_requirements(&line);

        assert_eq!(reqs[0].title.len(), 53);
        assert_eq!(reqs[0].title, format!("{}...", "b".repeat(50)));
        assert_eq!(reqs[0].text, line);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let line = "é".repeat(60);
        let title = make_title(&line);
        assert_eq!(title.chars().count(), 53);
        assert!(title.starts_with(&"é".repeat(50)));
    }

    #[test]
    fn test_extension_check() {
        assert!(has_accepted_extension(Path::new("reqs.txt")));
        assert!(has_accepted_extension(Path::new("dir/reqs.txt")));
        assert!(!has_accepted_extension(Path::new("reqs.TXT")));
        assert!(!has_accepted_extension(Path::new("reqs.md")));
        assert!(!has_accepted_extension(Path::new("reqs.txt.bak")));
    }

    #[test]
    fn test_load_rejects_wrong_extension() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "REQ line").unwrap();

        let err = load_requirements_file(file.path()).unwrap_err();
        assert!(matches!(err, UploadError::FileFormat(_)));
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.txt");

        let err = load_requirements_file(&path).unwrap_err();
        assert!(matches!(err, UploadError::FileRead { .. }));
    }

    #[test]
    fn test_load_parses_file() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Users must log in with 2FA\n\nMRN must be encrypted\n").unwrap();

        let reqs = load_requirements_file(file.path()).unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].req_id, "REQ-2");
        assert_eq!(reqs[1].text, "MRN must be encrypted");
    }

    #[test]
    fn test_load_strips_byte_order_marks() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"\xEF\xBB\xBFUsers must log in\n\xEF\xBB\xBF\nSecond")
            .unwrap();

        let reqs = load_requirements_file(file.path()).unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].text, "Users must log in");
        assert_eq!(reqs[0].title, "Users must log in");
        assert_eq!(reqs[1].req_id, "REQ-2");
        assert_eq!(reqs[1].text, "Second");
    }
}
