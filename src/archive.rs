use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Raw HTML dumps for offline debugging, one file per (keyword, page).
pub struct RawArchive {
    dir: PathBuf,
}

impl RawArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, keyword: &str, page: u32) -> PathBuf {
        self.dir
            .join(format!("page_{}_{}.html", file_safe(keyword), page))
    }

    pub fn save(&self, keyword: &str, page: u32, html: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(keyword, page);
        fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn file_safe(keyword: &str) -> String {
    keyword
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
