//! Error type shared by the loader, settings and platform start-up

use std::fmt;

#[derive(Debug)]
pub enum GameError {
    /// `get` on a resource that hasn't finished loading
    ResourceNotLoaded(String),
    /// The fetch for a resource failed
    ResourceFailed { name: String, reason: String },
    /// No canvas or no 2D context; the game cannot run
    SurfaceUnavailable(String),
    InvalidSettings(String),
    Json(serde_json::Error),
    /// Reading a settings file
    Io(std::io::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::ResourceNotLoaded(name) => write!(f, "resource {name} not loaded"),
            GameError::ResourceFailed { name, reason } => {
                write!(f, "resource {name} failed to load: {reason}")
            }
            GameError::SurfaceUnavailable(reason) => {
                write!(f, "drawing surface unavailable: {reason}")
            }
            GameError::InvalidSettings(reason) => write!(f, "invalid settings: {reason}"),
            GameError::Json(err) => write!(f, "settings JSON: {err}"),
            GameError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Json(err) => Some(err),
            GameError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Json(err)
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::Io(err)
    }
}
