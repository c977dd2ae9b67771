use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};

/// Durable home of the serialized event store.
///
/// Both operations move the whole document at once; there are no partial
/// updates.
pub trait Storage {
    /// Returns `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, contents: &str) -> Result<()>;

    fn location(&self) -> Option<&Path> {
        None
    }
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: &Path) -> Self {
        FileStorage {
            path: path.to_owned(),
        }
    }

    fn error(&self, action: &str, err: io::Error) -> Error {
        Error::new(
            ErrorKind::Persistence,
            &format!("could not {} '{}': {}", action, self.path.display(), err),
        )
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.error("read", err)),
        }
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.error("create directory for", e))?;
        }

        // Readers see either the old or the new document, never a torn one
        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        });

        if let Err(err) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(self.error("write", err));
        }

        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Keeps the document in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    contents: Option<String>,
}

impl MemoryStorage {
    pub fn with_contents(contents: &str) -> Self {
        MemoryStorage {
            contents: Some(contents.to_owned()),
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        self.contents = Some(contents.to_owned());
        Ok(())
    }
}
