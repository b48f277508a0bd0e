use crate::model::DatasetPage;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Raw listing pages cached on disk as `{year}.{page}.dat`.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn page_path(&self, page: DatasetPage) -> PathBuf {
        self.dir.join(page.file_name())
    }

    pub fn contains(&self, page: DatasetPage) -> bool {
        self.page_path(page).is_file()
    }

    /// Pages of `year` already on disk, ordered by page number.
    pub fn list_pages(&self, year: i32) -> Result<Vec<DatasetPage>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry
                .with_context(|| format!("failed to read dataset dir {}", self.dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some(page) = DatasetPage::parse_file_name(name)
                && page.year == year
            {
                pages.push(page);
            }
        }

        pages.sort();
        Ok(pages)
    }

    pub fn write_page(&self, page: DatasetPage, body: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create dataset dir {}", self.dir.display()))?;
        let path = self.page_path(page);
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write dataset page {}", path.display()))?;
        Ok(())
    }

    pub fn read_page(&self, page: DatasetPage) -> Result<String> {
        let path = self.page_path(page);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read dataset page {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
