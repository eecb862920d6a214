//! Local save actions for fetched report bytes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use super::error::SaveError;
use super::resource::TransientResource;

/// Destination that turns a transient resource into a saved file.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Saves the resource under `filename` and returns where it landed.
    ///
    /// # Errors
    ///
    /// Returns `SaveError` when the destination cannot accept the file.
    async fn save(&self, filename: &str, resource: &TransientResource)
    -> Result<PathBuf, SaveError>;
}

/// Saves reports into a directory, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    /// Creates a saver rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

}

#[async_trait]
impl SaveTarget for DirectorySaver {
    #[instrument(skip(self, resource), fields(resource = resource.id()))]
    async fn save(
        &self,
        filename: &str,
        resource: &TransientResource,
    ) -> Result<PathBuf, SaveError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SaveError::io(&self.dir, e))?;

        let path = resolve_unique_path(&self.dir, filename);
        debug!(path = %path.display(), "resolved save path");

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| SaveError::io(&path, e))?;
        file.write_all(resource.bytes())
            .await
            .map_err(|e| SaveError::io(&path, e))?;
        file.flush().await.map_err(|e| SaveError::io(&path, e))?;

        info!(path = %path.display(), bytes = resource.bytes().len(), "report saved");
        Ok(path)
    }
}

/// Replaces characters that are invalid on common filesystems.
///
/// Dot-only names are rewritten so they can never act as path segments.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Whether `name` keeps any meaningful character once sanitized.
pub(crate) fn is_usable_filename(name: &str) -> bool {
    !sanitize_filename(name).trim_matches('_').is_empty()
}

/// Resolves a path in `dir` that does not exist yet, adding `_N` suffixes on conflict.
///
/// Callers pass a usable name; the transaction substitutes the format default
/// before getting here.
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = if is_usable_filename(filename) {
        sanitize_filename(filename)
    } else {
        "report.bin".to_string()
    };
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };

    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::resource::ResourceLedger;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename_removes_invalid_chars() {
        assert_eq!(sanitize_filename("a/b.csv"), "a_b.csv");
        assert_eq!(sanitize_filename("a\\b.csv"), "a_b.csv");
        assert_eq!(sanitize_filename("a:b*c?.csv"), "a_b_c_.csv");
        assert_eq!(sanitize_filename("résumé.csv"), "résumé.csv");
    }

    #[test]
    fn test_sanitize_filename_rewrites_dot_segments() {
        assert_eq!(sanitize_filename("."), "_");
        assert_eq!(sanitize_filename(".."), "__");
    }

    #[test]
    fn test_is_usable_filename_rejects_names_that_sanitize_away() {
        assert!(is_usable_filename("q3.csv"));
        assert!(is_usable_filename("a/b.csv"));
        for junk in ["///", "..", ":*?", "_"] {
            assert!(!is_usable_filename(junk), "{junk:?} should not be usable");
        }
    }

    #[test]
    fn test_resolve_unique_path_with_conflicts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("report.csv"), b"1").unwrap();
        std::fs::write(temp_dir.path().join("report_1.csv"), b"2").unwrap();

        let path = resolve_unique_path(temp_dir.path(), "report.csv");
        assert_eq!(path, temp_dir.path().join("report_2.csv"));
    }

    #[test]
    fn test_resolve_unique_path_stays_under_dir() {
        let temp_dir = TempDir::new().unwrap();
        for malicious in ["../../etc/passwd", "..", "/abs/path.csv"] {
            let path = resolve_unique_path(temp_dir.path(), malicious);
            assert!(path.starts_with(temp_dir.path()), "escaped: {}", path.display());
            assert!(!path.components().any(|c| c == Component::ParentDir));
        }
    }

    #[tokio::test]
    async fn test_directory_saver_writes_resource_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let saver = DirectorySaver::new(temp_dir.path().join("reports"));
        let ledger = ResourceLedger::new();
        let resource = TransientResource::create(&ledger, b"id,name\n1,a\n".to_vec());

        let path = saver.save("sheet.csv", &resource).await.unwrap();
        resource.release();

        assert_eq!(path, temp_dir.path().join("reports").join("sheet.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"id,name\n1,a\n");
    }

    #[tokio::test]
    async fn test_directory_saver_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("sheet.csv"), b"old").unwrap();
        let saver = DirectorySaver::new(temp_dir.path());
        let ledger = ResourceLedger::new();
        let resource = TransientResource::create(&ledger, b"new".to_vec());

        let path = saver.save("sheet.csv", &resource).await.unwrap();

        assert_eq!(path, temp_dir.path().join("sheet_1.csv"));
        assert_eq!(std::fs::read(temp_dir.path().join("sheet.csv")).unwrap(), b"old");
    }
}
