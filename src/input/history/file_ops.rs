use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use super::HistoryError;

pub struct FileOps {
    file_path: PathBuf,
}

impl FileOps {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// One command per line, in file order. A missing file is an empty log.
    pub fn load_entries(&self) -> Result<Vec<String>, HistoryError> {
        let file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| self.io_error(e))?;
            if !line.trim().is_empty() {
                entries.push(line);
            }
        }
        Ok(entries)
    }

    /// Replaces the file contents with `entries`.
    pub fn save_entries<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), HistoryError> {
        let file = File::create(&self.file_path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        for entry in entries {
            writeln!(writer, "{}", entry).map_err(|e| self.io_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.file_path.clone(),
            source,
        }
    }
}
