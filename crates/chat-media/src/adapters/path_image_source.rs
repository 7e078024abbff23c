use chat_media_core::{CoreResult, ImageSource};

use std::path::PathBuf;

use async_trait::async_trait;

/// A "picker" whose choice was typed on the command line.
///
/// An empty path means the user backed out.
pub struct PathImageSource {
    path: PathBuf,
}

impl PathImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageSource for PathImageSource {
    async fn acquire_image(&self) -> CoreResult<Option<PathBuf>> {
        if self.path.as_os_str().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.path.clone()))
    }
}
