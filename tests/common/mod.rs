//! Shared test support: an in-memory `FileReader` double for module-resolver
//! tests that don't need real files on disk (spec §6.1 design note).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ts2jsonschema::error::{Error, Result};
use ts2jsonschema::FileReader;

pub struct MapReader {
    files: HashMap<PathBuf, String>,
}

impl MapReader {
    pub fn new(files: &[(&str, &str)]) -> Self {
        MapReader {
            files: files
                .iter()
                .map(|(path, content)| (PathBuf::from(path), content.to_string()))
                .collect(),
        }
    }
}

impl FileReader for MapReader {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| Error::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in MapReader"),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
