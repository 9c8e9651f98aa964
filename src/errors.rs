use std::fmt;

/// Error indicating that a [`Quota`](crate::Quota) could not be constructed
/// from the given parameters.
///
/// A gate with such a quota could never admit anything, or could never
/// close a window; both are rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidQuota {
    /// The number of admissions per window was zero.
    ZeroCapacity,

    /// The window length was zero.
    ZeroWindow,
}

impl fmt::Display for InvalidQuota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidQuota::ZeroCapacity => write!(f, "capacity must be a positive value"),
            InvalidQuota::ZeroWindow => write!(f, "window length must be a positive value"),
        }
    }
}

impl std::error::Error for InvalidQuota {}

/// Error indicating that an admission was abandoned because the caller's
/// cancellation token fired.
///
/// This is returned instead of an [`Admission`](crate::Admission): the
/// caller was neither admitted immediately nor after a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "admission was cancelled")
    }
}

impl std::error::Error for Cancelled {}
