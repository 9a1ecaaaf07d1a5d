//! Capability providers resolved once at startup.
//!
//! Speech recognition, speech synthesis and face detection may be missing on
//! the host. Instead of probing for them at every call site, the composition
//! root resolves each one into a [`Capability`] and hands it to the controller.

use std::fmt;

/// A provider that is either usable or known to be missing.
#[derive(Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Capability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Available(provider) => Some(provider),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => write!(f, "Available"),
            Self::Unavailable { reason } => write!(f, "Unavailable({})", reason),
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(provider) => Self::Available(provider),
            None => Self::unavailable("not provided"),
        }
    }
}
