use crate::lang::Error;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let when = match self.modified {
            Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
            None => "                ".to_string(),
        };
        if self.is_dir {
            write!(f, "{}  {:>10}  {}/", when, "<DIR>", self.name)
        } else {
            write!(f, "{}  {:>10}  {}", when, self.size, self.name)
        }
    }
}

/// File access the shell needs for SAVE, LOAD, DIR and carts.
pub trait Storage: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
    /// Entries sorted by name.
    fn list(&self, dir: &Path) -> Result<Vec<Entry>>;
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;
    fn create_dir(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/// The local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disk;

impl Storage for Disk {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        debug!(path = %path.display(), "read");
        Ok(std::fs::read(path)?)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        debug!(path = %path.display(), bytes = data.len(), "write");
        Ok(std::fs::write(path, data)?)
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        let mut entries = vec![];
        for item in std::fs::read_dir(dir)? {
            let item = item?;
            let meta = item.metadata()?;
            entries.push(Entry {
                name: item.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Local>::from),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        debug!(from = %from.display(), to = %to.display(), "copy");
        Ok(std::fs::copy(from, to)?)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "create dir");
        Ok(std::fs::create_dir_all(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Resolve a user supplied program path. Relative paths are taken from
/// `base` and `.bas` is added when there is no extension.
pub fn program_path(base: &Path, name: &str) -> PathBuf {
    let mut path = base.join(name);
    if path.extension().is_none() {
        path.set_extension("bas");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_program_path() {
        let base = Path::new("/progs");
        assert_eq!(program_path(base, "game"), PathBuf::from("/progs/game.bas"));
        assert_eq!(program_path(base, "game.txt"), PathBuf::from("/progs/game.txt"));
        assert_eq!(program_path(base, "/abs/x"), PathBuf::from("/abs/x.bas"));
    }

    #[test]
    fn test_disk() {
        let dir = tempfile::tempdir().unwrap();
        let disk = Disk;
        let a = dir.path().join("a.bas");
        disk.write(&a, b"10 END\n").unwrap();
        disk.create_dir(&dir.path().join("sub")).unwrap();
        assert_eq!(disk.copy(&a, &dir.path().join("b.bas")).unwrap(), 7);
        let names: Vec<String> = disk
            .list(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.bas", "b.bas", "sub"]);
        assert!(disk.exists(&a));
        let e = disk.read(&dir.path().join("missing")).unwrap_err();
        assert!(e.is(ErrorCode::FileNotFound));
    }
}
