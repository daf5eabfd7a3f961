use thiserror::Error;

/// Failure subtypes for a one-shot position query.
///
/// Each variant carries the user-facing message shown in the status
/// region; the orchestrator surfaces them verbatim.
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Permission denied. Please allow access to your location.")]
    PermissionDenied,

    #[error("Location unavailable. Please try again later.")]
    PositionUnavailable,

    #[error("Timed out while acquiring your location.")]
    Timeout,

    #[error("Unknown error while acquiring your location.")]
    Unknown,

    #[error("Location lookup is not supported on this device.")]
    Unsupported,
}
