//! File-backed storage under an XDG cache directory

use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

use super::Storage;

/// Key-value store persisting each key as a file on disk
///
/// Files live in an XDG-compliant cache directory
/// (`~/.cache/campus-assist/` on Linux). Write and remove failures are
/// swallowed: storage is an optimization layer, and the contract of
/// [`Storage`] has no error channel.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory where entries are stored
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a store using the XDG-compliant cache directory.
    ///
    /// Returns `None` if the base directory cannot be determined
    /// (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "campus-assist")?;
        let dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { dir })
    }

    /// Creates a store rooted at a custom directory.
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the file path for the given key.
    ///
    /// Keys are mangled into safe file names; distinct keys are assumed
    /// not to collide after mangling (cache keys here are short ASCII
    /// identifiers with `:` namespace separators).
    fn entry_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    /// Ensures the backing directory exists.
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) {
        if self.ensure_dir().is_ok() {
            let _ = fs::write(self.entry_path(key), value);
        }
    }

    fn remove_item(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key));
    }
}
