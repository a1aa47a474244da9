use std::io::ErrorKind;
use std::path::Path;

use reqwest::header::{HeaderMap, RANGE};
use tokio::fs::{File, OpenOptions};

use crate::error::Result;

/// Where a download picks up, read from the size of the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    offset: u64,
}

impl ResumePoint {
    pub async fn probe(path: &Path) -> Result<Self> {
        let offset = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata.len(),
            Err(err) if err.kind() == ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };

        Ok(Self { offset })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_resuming(&self) -> bool {
        self.offset > 0
    }

    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if self.is_resuming() {
            headers.insert(RANGE, format!("bytes={}-", self.offset).try_into()?);
        }
        Ok(headers)
    }

    /// Opens `path` for appending when resuming, otherwise creates or truncates it.
    pub async fn open(&self, path: &Path) -> Result<File> {
        let mut options = OpenOptions::new();
        if self.is_resuming() {
            options.append(true);
        } else {
            options.write(true).create(true).truncate(true);
        }

        Ok(options.open(path).await?)
    }
}
