// Error types for the PiStorm device and its collaborators.
// None of these reach the guest; the dispatcher turns them into a CommandResult.

use std::path::PathBuf;

use thiserror::Error;

use crate::registers::CommandResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StringFetchError {
    #[error("null string pointer")]
    NullPointer,
    #[error("string at ${address:08X} not terminated within {max_len} bytes")]
    Unterminated { address: u32, max_len: usize },
    #[error("string at ${address:08X} runs past the end of its mapped region")]
    OutOfRegion { address: u32 },
    #[error("string at ${address:08X} is not valid UTF-8")]
    InvalidUtf8 { address: u32 },
}

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("no mapped range tagged '{0}'")]
    UnknownTag(String),
    #[error("image for '{tag}' is {actual} bytes, region is {expected}")]
    SizeMismatch {
        tag: String,
        expected: u32,
        actual: usize,
    },
    #[error("failed to load ROM image {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("invalid drive number {0}")]
    InvalidDrive(u16),
    #[error("failed to open drive image {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can make a device command fail.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error(transparent)]
    String(#[from] StringFetchError),
    #[error("file not found: {0:?}")]
    FileNotFound(PathBuf),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Drive(#[from] DriveError),
}

impl DeviceError {
    pub fn result(&self) -> CommandResult {
        match self {
            DeviceError::FileNotFound(_) => CommandResult::FileNotFound,
            DeviceError::Drive(DriveError::InvalidDrive(_)) => CommandResult::InvalidValue,
            _ => CommandResult::Failed,
        }
    }
}
