use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling of `dest` unique to this process and write,
/// e.g. `.requirements_cache.json.tmp.4242.7`.
fn unique_tmp_path(dest: &Path) -> PathBuf {
    let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_else(|| OsStr::new("cache")));
    name.push(format!(".tmp.{}.{}", std::process::id(), counter));
    dest.with_file_name(name)
}

/// Cache storage for local runs. Relative paths resolve against `root`;
/// an empty root means the working directory.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() || self.root.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.resolve(path)).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // write a sibling file, then rename over the target
        let tmp_path = unique_tmp_path(&full_path);
        tokio::fs::write(&tmp_path, data).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &full_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage
            .write_file("cache/requirements.json", b"{}")
            .await
            .unwrap();
        let data = storage.read_file("cache/requirements.json").await.unwrap();

        assert_eq!(data, b"{}");
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path().join("cache"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![OsString::from("requirements.json")]);
        assert!(storage.read_file("missing.json").await.is_err());
    }

    #[test]
    fn test_tmp_paths_are_unique_per_write() {
        let dest = Path::new("/data/requirements_cache.json");
        let first = unique_tmp_path(dest);
        let second = unique_tmp_path(dest);

        assert_ne!(first, second);
        assert_eq!(first.parent(), dest.parent());
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".requirements_cache.json.tmp."));
        assert!(name.contains(&std::process::id().to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_clash() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let (a, b, c) = tokio::join!(
            storage.write_file("shared.json", &[1; 64]),
            storage.write_file("shared.json", &[2; 64]),
            storage.write_file("shared.json", &[3; 64]),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        let data = storage.read_file("shared.json").await.unwrap();
        assert_eq!(data.len(), 64);
        assert!(data.iter().all(|b| *b == data[0]));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_absolute_paths_ignore_root() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("abs.json");
        let storage = LocalStorage::new("/definitely/not/here");

        storage
            .write_file(&target.to_string_lossy(), b"[]")
            .await
            .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"[]");
    }
}
