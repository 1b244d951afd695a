use thiserror::Error;

/// Data-level extraction failures. These are recoverable: callers either
/// degrade to a default or drop the offending element.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed number: {0:?}")]
    MalformedNumber(String),

    #[error("creation date not found in about page")]
    DateNotFound,
}

/// Filter-configuration failures. These abort the run before any page is
/// fetched; a bad filter file is an operator error, not a data error.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("no filter implemented for field {0:?}")]
    UnsupportedFilterField(String),

    #[error("a description filter without a value is not allowed")]
    MissingFilterValue,

    #[error("bad date bound {0:?} (expected YYYY-MM-DD)")]
    BadDateBound(String),

    #[error("bad numeric bound {0} (expected a number)")]
    BadNumberBound(String),
}

/// Conflicts detected when folding advanced data into a basic record.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("field {0:?} already populated with different data")]
    Conflict(&'static str),

    #[error("enriched admin list does not match the basic roster")]
    AdminRosterMismatch,
}
