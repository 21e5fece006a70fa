//! Policy document loading.
//!
//! Exactly one document with a recognized extension is discovered in a fixed
//! directory and its text is extracted once per process. PDFs go through the
//! external `pdftotext` tool (first page only); plain-text documents are read
//! directly and truncated at the first form feed.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tokio::sync::OnceCell;

const RECOGNIZED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("no policy document with a recognized extension in `{}`", .dir.display())]
    NoDocument { dir: PathBuf },
    #[error("could not read policy directory `{}`: {source}", .dir.display())]
    ReadDir { dir: PathBuf, source: std::io::Error },
    #[error("could not read policy document `{}`: {source}", .path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("pdftotext was not found on PATH; cannot extract `{}`", .path.display())]
    MissingExtractor { path: PathBuf },
    #[error("text extraction failed for `{}`: {message}", .path.display())]
    Extraction { path: PathBuf, message: String },
}

/// Process-lifetime read cache over the policy document. The text is loaded
/// lazily on first use and only a restart invalidates it.
#[derive(Debug, Default)]
pub struct PolicyStore {
    document_dir: PathBuf,
    cache: OnceCell<String>,
}

impl PolicyStore {
    pub fn new(document_dir: impl Into<PathBuf>) -> Self {
        Self { document_dir: document_dir.into(), cache: OnceCell::new() }
    }

    pub fn document_dir(&self) -> &Path {
        &self.document_dir
    }

    /// Find the policy document without extracting it. Readiness probes use
    /// this to report discovery problems before a request needs the text.
    pub fn locate(&self) -> Result<PathBuf, PolicyError> {
        let entries = std::fs::read_dir(&self.document_dir)
            .map_err(|source| PolicyError::ReadDir { dir: self.document_dir.clone(), source })?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| RECOGNIZED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| PolicyError::NoDocument { dir: self.document_dir.clone() })
    }

    /// The policy text, extracting it on first call and serving the cached
    /// copy afterwards.
    pub async fn document_text(&self) -> Result<&str, PolicyError> {
        self.cache
            .get_or_try_init(|| async {
                let path = self.locate()?;
                extract_first_page(&path).await
            })
            .await
            .map(String::as_str)
    }
}

async fn extract_first_page(path: &Path) -> Result<String, PolicyError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => extract_pdf_first_page(path).await?,
        _ => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| PolicyError::ReadFile { path: path.to_path_buf(), source })?;
            // A form feed marks a page break in plain-text exports.
            raw.split('\u{c}').next().unwrap_or_default().to_string()
        }
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PolicyError::Extraction {
            path: path.to_path_buf(),
            message: "document produced no text".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

async fn extract_pdf_first_page(path: &Path) -> Result<String, PolicyError> {
    let pdftotext = which::which("pdftotext")
        .map_err(|_| PolicyError::MissingExtractor { path: path.to_path_buf() })?;

    let output = Command::new(pdftotext)
        .arg("-f")
        .arg("1")
        .arg("-l")
        .arg("1")
        .arg(path)
        .arg("-")
        .output()
        .await
        .map_err(|source| PolicyError::ReadFile { path: path.to_path_buf(), source })?;

    if !output.status.success() {
        return Err(PolicyError::Extraction {
            path: path.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{PolicyError, PolicyStore};

    #[tokio::test]
    async fn loads_plain_text_document_up_to_first_page_break() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join("leave-policy.txt"),
            "No leave during the release freeze (1 Mar to 5 Mar).\u{c}second page is ignored",
        )
        .expect("write policy");

        let store = PolicyStore::new(dir.path());
        let text = store.document_text().await.expect("policy text");
        assert_eq!(text, "No leave during the release freeze (1 Mar to 5 Mar).");
    }

    #[tokio::test]
    async fn caches_text_across_calls() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("policy.md");
        fs::write(&path, "original policy text").expect("write policy");

        let store = PolicyStore::new(dir.path());
        assert_eq!(store.document_text().await.expect("first load"), "original policy text");

        fs::write(&path, "rewritten after first load").expect("rewrite policy");
        assert_eq!(
            store.document_text().await.expect("cached load"),
            "original policy text",
            "cache must only be invalidated by process restart"
        );
    }

    #[tokio::test]
    async fn missing_document_is_an_explicit_error() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("notes.bin"), "not a recognized extension").expect("write file");

        let store = PolicyStore::new(dir.path());
        let error = store.document_text().await.expect_err("no recognized document");
        assert!(matches!(error, PolicyError::NoDocument { .. }));
    }

    #[test]
    fn locate_prefers_first_candidate_in_name_order() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("b-policy.txt"), "b").expect("write file");
        fs::write(dir.path().join("a-policy.txt"), "a").expect("write file");

        let store = PolicyStore::new(dir.path());
        let located = store.locate().expect("document located");
        assert!(located.ends_with("a-policy.txt"));
    }
}
