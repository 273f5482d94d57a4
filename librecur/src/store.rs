use crate::error::{RecurError, Result};

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// File access used by the loader and by posting.
pub trait Store {
    /// Lines of `path`, each keeping its line terminator.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>>;
    /// Replaces the whole content of `path`.
    fn overwrite(&self, path: &Path, text: &str) -> Result<()>;
    /// Adds `text` at the end of `path`, creating it when missing.
    fn append(&self, path: &Path, text: &str) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FileStore;

impl Store for FileStore {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path).map_err(|e| RecurError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| RecurError::io(path, e))?;
            if read == 0 {
                break;
            }
            lines.push(line);
        }
        Ok(lines)
    }

    fn overwrite(&self, path: &Path, text: &str) -> Result<()> {
        let mut file = File::create(path).map_err(|e| RecurError::io(path, e))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| RecurError::io(path, e))
    }

    fn append(&self, path: &Path, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| RecurError::io(path, e))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| RecurError::io(path, e))
    }
}
