use std::fs::File;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Removable medium the hex file is read from, seen as a mounted directory.
#[derive(Debug, Clone)]
pub struct Medium {
    root: PathBuf,
}

pub struct HexFile {
    pub path: PathBuf,
    pub file: File,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage medium not available at {}", root.display())]
    Unavailable { root: PathBuf },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("unable to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Medium {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open(&self, name: &str) -> Result<HexFile, StorageError> {
        if !self.root.is_dir() {
            return Err(StorageError::Unavailable {
                root: self.root.clone(),
            });
        }

        let path = self.root.join(name);
        match File::open(&path) {
            Ok(file) => Ok(HexFile { path, file }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound { path })
            }
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }
}
