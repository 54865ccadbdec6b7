//! Sampler error kinds.
//!
//! Transient conditions — prior rejection, a degenerate autocorrelation
//! estimate, a stale broadcast — are never represented here; they are
//! handled locally (usually via `log::warn!`) exactly where they occur.
//! Only structural conditions that should stop a rank reach this enum.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SamplerError {
    /// I/O failure opening, writing, or reading a chain/checkpoint file.
    Io(io::Error),
    /// A kernel was registered with zero weight.
    ZeroCycleWeight,
    /// A checkpoint file could not be parsed even after dropping a
    /// truncated final line and retrying once.
    TruncatedCheckpoint { path: String },
    /// A neighboring rank's channel disconnected mid-handshake.
    PeerDisconnected { rank: usize },
    /// Temperature ladder is empty, non-increasing, or `Tmin <= 0`.
    InvalidLadder(String),
    /// `ndim` does not match the dimensions of the supplied covariance.
    DimensionMismatch { expected: usize, found: usize },
    /// RJMCMC wrapper was asked to select or jump to a model name
    /// that was never registered.
    UnknownModel(String),
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::ZeroCycleWeight => {
                write!(f, "cannot add a proposal kernel to the cycle with zero weight")
            }
            Self::TruncatedCheckpoint { path } => {
                write!(f, "checkpoint file {path} unreadable after retry")
            }
            Self::PeerDisconnected { rank } => {
                write!(f, "peer rank {rank} disconnected during handshake")
            }
            Self::InvalidLadder(msg) => write!(f, "invalid temperature ladder: {msg}"),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "dimension mismatch: expected {expected}, found {found}"
            ),
            Self::UnknownModel(name) => write!(f, "no model registered under name {name:?}"),
        }
    }
}

impl std::error::Error for SamplerError {}

impl From<io::Error> for SamplerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, SamplerError>;
