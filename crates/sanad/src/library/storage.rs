use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::sanitize::slugify;

use super::LibraryError;

const SLUG_MAX_LEN: usize = 80;

/// Document blobs under `<root>/documents/YYYY/MM/`.
pub struct DocumentStorage {
    root: PathBuf,
}

/// Where a stored blob landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub absolute: PathBuf,
    /// `/`-separated, relative to the storage root.
    pub relative: String,
}

impl DocumentStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Writes `content` as `<slug>_<timestamp>_<rand8>.<ext>`, never overwriting.
    pub fn store(
        &self,
        content: &[u8],
        title: &str,
        extension: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredFile, LibraryError> {
        let relative_dir = format!("documents/{}", now.format("%Y/%m"));
        let dir_path = self.resolve(&relative_dir);
        std::fs::create_dir_all(&dir_path).map_err(|e| LibraryError::Storage {
            path: dir_path.clone(),
            source: e,
        })?;

        let stem = format!(
            "{}_{}_{}",
            slugify(title, SLUG_MAX_LEN),
            now.format("%Y%m%d%H%M%S"),
            random_suffix()
        );

        for counter in 1..=1000 {
            let filename = if counter == 1 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}_{}.{}", stem, counter, extension)
            };
            let path = dir_path.join(&filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(content).and_then(|_| file.sync_all()) {
                        drop(file);
                        let _ = std::fs::remove_file(&path);
                        return Err(LibraryError::Storage { path, source: e });
                    }
                    return Ok(StoredFile {
                        absolute: path,
                        relative: format!("{}/{}", relative_dir, filename),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(LibraryError::Storage { path, source: e }),
            }
        }

        Err(LibraryError::Storage {
            path: dir_path.join(stem),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free file name available",
            ),
        })
    }

    /// Removes a stored blob. A file that is already gone is not an error.
    pub fn remove(&self, relative: &str) -> Result<(), LibraryError> {
        let path = self.resolve(relative);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(file = %relative, "library.remove: file already missing");
                Ok(())
            }
            Err(e) => Err(LibraryError::Storage { path, source: e }),
        }
    }
}

fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_store_layout() {
        let temp = TempDir::new().unwrap();
        let storage = DocumentStorage::new(temp.path());

        let stored = storage
            .store(b"%PDF-1.5", "Sahih Bukhari", "pdf", fixed_now())
            .unwrap();

        assert!(stored.relative.starts_with("documents/2024/05/Sahih_Bukhari_20240517093005_"));
        assert!(stored.relative.ends_with(".pdf"));
        let filename = stored.relative.rsplit('/').next().unwrap();
        let rand = filename
            .trim_end_matches(".pdf")
            .rsplit('_')
            .next()
            .unwrap();
        assert_eq!(rand.len(), 8);
        assert_eq!(stored.absolute, storage.resolve(&stored.relative));
        assert_eq!(std::fs::read(&stored.absolute).unwrap(), b"%PDF-1.5");
    }

    #[test]
    fn test_store_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let storage = DocumentStorage::new(temp.path());

        let first = storage.store(b"one", "same", "pdf", fixed_now()).unwrap();
        let second = storage.store(b"two", "same", "pdf", fixed_now()).unwrap();

        assert_ne!(first.absolute, second.absolute);
        assert_eq!(std::fs::read(&first.absolute).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.absolute).unwrap(), b"two");
    }

    #[test]
    fn test_arabic_title_uses_fallback_slug() {
        let temp = TempDir::new().unwrap();
        let storage = DocumentStorage::new(temp.path());

        let stored = storage.store(b"x", "سنن أبي داود", "docx", fixed_now()).unwrap();
        assert!(stored.relative.starts_with("documents/2024/05/document_"));
        assert!(stored.relative.ends_with(".docx"));
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let temp = TempDir::new().unwrap();
        let storage = DocumentStorage::new(temp.path());

        let stored = storage.store(b"x", "a", "pdf", fixed_now()).unwrap();
        storage.remove(&stored.relative).unwrap();
        assert!(!stored.absolute.exists());
        storage.remove(&stored.relative).unwrap();
    }
}
