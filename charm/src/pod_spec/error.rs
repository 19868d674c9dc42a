use snafu::Snafu;

/// Why a pod spec could not be assembled from the current options and
/// relation data. The message is surfaced verbatim as the blocked status.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("{option} is required"))]
    MissingOption { option: &'static str },

    #[snafu(display("{option} must equal {expected}"))]
    InvalidOption { option: &'static str, expected: String },

    #[snafu(display("{field} is required"))]
    MissingRelationData { field: &'static str },

    #[snafu(display("{field} must start with '{prefix}'"))]
    InvalidRelationData { field: &'static str, prefix: &'static str },
}
