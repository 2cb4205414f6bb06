use std::{fmt, io};

use font_types::Tag;
use thiserror::Error;

/// Boxed error returned by a zlib decompressor
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = WoffError> = std::result::Result<T, E>;

/// Which size was being checked when a [`WoffError::SizeMismatch`] occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeContext {
    /// The `totalSfntSize` field of the WOFF header
    TotalSfntSize,
    /// The decompressed length of a single table
    Table(Tag),
}

impl fmt::Display for SizeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeContext::TotalSfntSize => f.write_str("'totalSfntSize'"),
            SizeContext::Table(tag) => write!(f, "length of the '{tag}' table"),
        }
    }
}

/// Everything that can go wrong while converting a WOFF font.
///
/// All errors are fatal to the conversion in progress. The `Display` impl of each variant
/// is the message reported to the user.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WoffError {
    #[error("unable to load the WOFF font file: {0}")]
    InputUnreadable(#[source] io::Error),
    #[error("unable to create the OpenType file: {0}")]
    OutputUnwritable(#[source] io::Error),
    #[error("unexpected end of input while reading {what}")]
    TruncatedInput { what: &'static str },
    #[error("no tables found")]
    EmptyDirectory,
    #[error("invalid {context}: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        context: SizeContext,
        expected: u64,
        actual: u64,
    },
    #[error("error decompressing the '{tag}' table: {source}")]
    DecompressionFailed {
        tag: Tag,
        #[source]
        source: BoxError,
    },
    #[error("not a WOFF 1.0 file (signature '{0}')")]
    InvalidSignature(Tag),
    #[error("checksum mismatch for the '{tag}' table: directory has {expected:#010x}, data sums to {actual:#010x}")]
    ChecksumMismatch { tag: Tag, expected: u32, actual: u32 },
}

impl From<bytes::TryGetError> for WoffError {
    fn from(_value: bytes::TryGetError) -> Self {
        Self::TruncatedInput { what: "input data" }
    }
}

impl WoffError {
    /// Map an I/O error raised while reading `what` from the input.
    ///
    /// Running out of bytes is a [`WoffError::TruncatedInput`], anything else means
    /// the input could not be read at all.
    pub(crate) fn reading(what: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |err| match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::TruncatedInput { what },
            _ => Self::InputUnreadable(err),
        }
    }
}

pub(crate) fn u32_will_overflow(a: u32, b: u32) -> bool {
    a.checked_add(b).is_none()
}

#[cfg(not(feature = "debug"))]
mod regular {
    macro_rules! bail_if {
        ($cond: expr, $err: expr) => {
            if $cond {
                return Err($err);
            }
        };
    }
    pub(crate) use bail_if;
}
#[cfg(not(feature = "debug"))]
pub(crate) use regular::*;

#[cfg(feature = "debug")]
mod debug {
    macro_rules! bail_if {
        ($cond: expr, $err: expr) => {
            if $cond {
                panic!("{}: {}", stringify!($cond), $err)
            }
        };
    }
    pub(crate) use bail_if;
}
#[cfg(feature = "debug")]
pub(crate) use debug::*;
