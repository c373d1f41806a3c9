//! Image collaborator used for plugin and module images

use crate::error::ImageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A resolved image reference
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    /// Path as written in the configuration
    pub path: String,
    /// Image bytes, when the loader reads them
    #[serde(skip)]
    pub data: Option<Arc<[u8]>>,
}

impl ImageHandle {
    pub fn unloaded<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("path", &self.path)
            .field("bytes", &self.data.as_ref().map(|data| data.len()))
            .finish()
    }
}

/// Resolves image paths found in a configuration
pub trait ImageLoader {
    fn load_image(&self, path: &str) -> Result<ImageHandle, ImageError>;
}

/// Records image paths without touching the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct PathOnlyImageLoader;

impl ImageLoader for PathOnlyImageLoader {
    fn load_image(&self, path: &str) -> Result<ImageHandle, ImageError> {
        Ok(ImageHandle::unloaded(path))
    }
}

/// Reads images from an unpacked package directory.
///
/// Configurations are written on Windows, so `\` separators are accepted.
/// Paths that would leave the package directory are reported as not found.
#[derive(Debug, Clone)]
pub struct DirectoryImageLoader {
    root: PathBuf,
}

impl DirectoryImageLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = PathBuf::from(path.replace('\\', "/"));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

impl ImageLoader for DirectoryImageLoader {
    fn load_image(&self, path: &str) -> Result<ImageHandle, ImageError> {
        let full_path = self.resolve(path).ok_or_else(|| ImageError::NotFound {
            path: PathBuf::from(path),
        })?;

        match std::fs::read(&full_path) {
            Ok(bytes) => Ok(ImageHandle {
                path: path.to_string(),
                data: Some(Arc::from(bytes)),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ImageError::NotFound { path: full_path })
            }
            Err(source) => Err(ImageError::Io {
                path: full_path,
                source,
            }),
        }
    }
}
