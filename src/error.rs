use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Mesh file missing or unreadable
    #[error("Cannot read {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Unsupported mesh format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Import succeeded but produced no triangles
    #[error("Scene contains no triangles: {}", .0.display())]
    EmptyScene(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scene description text, 1-based line
    #[error("Malformed scene file at line {line}: {reason}")]
    MalformedScene { line: usize, reason: String },

    #[error("Invalid render config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
