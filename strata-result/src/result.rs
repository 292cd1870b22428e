use crate::error::Error;

/// Result type alias used throughout strata.
///
/// Shorthand for `std::result::Result<T, Error>`. All strata operations that
/// can fail return this type.
pub type Result<T> = std::result::Result<T, Error>;
