use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use crate::scanner::ScanError;

const TOKEN_PATTERN: &str = r"[A-Za-z0-9:/.\-]+";

fn token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// Splits raw text into utility-class candidates, in match order.
///
/// Duplicates are kept; callers collect tokens into a set across files.
pub fn tokenize(text: &str) -> Vec<&str> {
    token_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Reads one file and tokenizes it.
///
/// A file that no longer exists surfaces as [`ScanError::NotFound`] so the
/// caller can skip it; every other read failure is [`ScanError::Read`].
pub fn tokenize_file(path: &Path) -> Result<Vec<String>, ScanError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ScanError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ScanError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(tokenize(&text).into_iter().map(str::to_string).collect())
}
