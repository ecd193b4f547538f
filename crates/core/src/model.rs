use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("Model file is empty: {0}")]
    Empty(PathBuf),

    #[error("Unsupported model format: {0} (expected a .onnx or .dfg file)")]
    UnsupportedFormat(PathBuf),
}

/// Model artifact formats understood by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// ONNX graph, handed to the runtime by path.
    Onnx,
    /// Compiled dataflow graph, handed to the runtime as raw bytes.
    Dfg,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("onnx") => Some(Self::Onnx),
            Some("dfg") => Some(Self::Dfg),
            _ => None,
        }
    }
}

/// A resolved model artifact, ready to be passed to a session constructor.
#[derive(Clone, PartialEq, Eq)]
pub enum ModelSource {
    Path(PathBuf),
    Bytes { path: PathBuf, bytes: Vec<u8> },
}

impl ModelSource {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        match ModelFormat::from_path(path) {
            Some(ModelFormat::Onnx) => {
                if !path.is_file() {
                    return Err(ModelLoadError::NotFound(path.to_path_buf()));
                }
                Ok(Self::Path(path.to_path_buf()))
            }
            Some(ModelFormat::Dfg) => {
                let start = Instant::now();
                let bytes = fs::read(path).map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => ModelLoadError::NotFound(path.to_path_buf()),
                    _ => ModelLoadError::Io(e),
                })?;
                if bytes.is_empty() {
                    return Err(ModelLoadError::Empty(path.to_path_buf()));
                }
                log::info!(
                    "read model: {} bytes from {:?} in {:?}",
                    bytes.len(),
                    path,
                    start.elapsed()
                );
                Ok(Self::Bytes {
                    path: path.to_path_buf(),
                    bytes,
                })
            }
            None => Err(ModelLoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Path(path) | Self::Bytes { path, .. } => path,
        }
    }

    pub fn format(&self) -> ModelFormat {
        match self {
            Self::Path(_) => ModelFormat::Onnx,
            Self::Bytes { .. } => ModelFormat::Dfg,
        }
    }
}

// Keeps model bytes out of debug logs.
impl fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes { path, bytes } => f
                .debug_struct("Bytes")
                .field("path", path)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}
