//! JSON import/export of the quote collection.
//!
//! # Responsibility
//! - Serialize the full collection as indented JSON (`quotes.json`).
//! - Validate and append quotes from a user-supplied JSON array.
//!
//! # Invariants
//! - Import is all-or-nothing on parse failure or a non-array payload.
//! - Elements without a non-empty `text` are skipped, never fatal.
//! - `text` and `category` are stored exactly as given; trimming only
//!   decides whether a value counts as blank.
//! - Imported quotes always get fresh local ids and `synced = false`.

use crate::model::quote::{next_local_id, Quote, IMPORTED_CATEGORY};
use crate::repo::quote_repo::RepoError;
use crate::service::quote_book::QuoteBook;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File name used for exports.
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Import/export failure.
#[derive(Debug)]
pub enum TransferError {
    /// Payload is not valid JSON.
    Parse(serde_json::Error),
    /// Payload is valid JSON but the top level is not an array.
    NotAnArray,
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
    /// The highest id is already `QuoteId::MAX`.
    IdsExhausted,
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "error reading JSON: {err}"),
            Self::NotAnArray => write!(f, "invalid JSON format: expected an array of quotes"),
            Self::Io { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::Encode(err) => write!(f, "failed to encode quotes: {err}"),
            Self::IdsExhausted => write!(f, "no local quote id left for imported quotes"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Encode(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::NotAnArray | Self::IdsExhausted => None,
        }
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Serializes quotes as two-space indented JSON.
pub fn export_json(quotes: &[Quote]) -> Result<String, TransferError> {
    serde_json::to_string_pretty(quotes).map_err(TransferError::Encode)
}

/// Writes `quotes.json` into `dir` and returns the written path.
pub fn export_to_dir(dir: impl AsRef<Path>, quotes: &[Quote]) -> Result<PathBuf, TransferError> {
    let path = dir.as_ref().join(EXPORT_FILE_NAME);
    let payload = export_json(quotes)?;
    std::fs::write(&path, payload).map_err(|source| TransferError::Io {
        path: path.clone(),
        source,
    })?;
    info!(
        "event=quotes_export module=transfer status=ok count={}",
        quotes.len()
    );
    Ok(path)
}

/// Appends every valid element of a JSON array payload to `book`.
pub fn import_json(book: &mut QuoteBook, payload: &str) -> Result<ImportSummary, TransferError> {
    let parsed: Value = serde_json::from_str(payload).map_err(|err| {
        warn!("event=quotes_import module=transfer status=error error_code=parse_failed");
        TransferError::Parse(err)
    })?;
    let Value::Array(items) = parsed else {
        warn!("event=quotes_import module=transfer status=error error_code=not_an_array");
        return Err(TransferError::NotAnArray);
    };

    let mut staged = book.quotes().to_vec();
    let mut summary = ImportSummary::default();
    for item in &items {
        match imported_fields(item) {
            Some((text, category)) => {
                let Some(id) = next_local_id(&staged) else {
                    warn!("event=quotes_import module=transfer status=error error_code=ids_exhausted");
                    return Err(TransferError::IdsExhausted);
                };
                staged.push(Quote::new(id, text, category));
                summary.imported += 1;
            }
            None => summary.skipped += 1,
        }
    }

    book.commit(staged)?;
    info!(
        "event=quotes_import module=transfer status=ok imported={} skipped={}",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

/// Reads a JSON file and imports it into `book`.
pub fn import_from_file(
    book: &mut QuoteBook,
    path: impl AsRef<Path>,
) -> Result<ImportSummary, TransferError> {
    let path = path.as_ref();
    let payload = std::fs::read_to_string(path).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_json(book, &payload)
}

fn imported_fields(item: &Value) -> Option<(&str, &str)> {
    let text = item.get("text")?.as_str()?;
    if text.trim().is_empty() {
        return None;
    }
    let category = item
        .get("category")
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(IMPORTED_CATEGORY);
    Some((text, category))
}
