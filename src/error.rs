//! Crate-wide error type for the fallible public API.
//!
//! The low-level functions in [`crate::ecdsa::hazmat`] keep spec's exact
//! flag/bool contract (a `u64` flag for signing, a `bool` for verification
//! and decompression) because their callers are expected to have already
//! done their own input validation. This type exists only for the
//! additive `Result`-returning wrapper layer built on top of them,
//! mirroring the teacher's `elliptic_curve::Error`: a single opaque
//! failure variant, since every fallible operation here (point decoding,
//! signature parsing, signing, verification) can fail for reasons a
//! caller must not be able to branch on.

use core::fmt;

/// Opaque error type returned by this crate's fallible public API.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Error;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P-256 cryptographic operation failed")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result alias using this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
