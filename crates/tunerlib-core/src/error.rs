//! Error types for tunerlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer and driver-layer
//! failures are all captured here.

/// The error type for all tunerlib operations.
///
/// Variants cover the failure modes of driving a tuner chip over a shared
/// two-wire bus: transport faults, lifecycle violations, and concurrent
/// command rejection. Note that a seek/tune deadline expiry is *not* an
/// error -- it resolves to `found = false` at the call site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bus-level error (two-wire controller fault, NAK, lost arbitration).
    #[error("bus transport error: {0}")]
    Transport(String),

    /// The driver has been shut down; no further bus access is performed.
    #[error("tuner has been shut down")]
    Disposed,

    /// A seek or tune operation is already outstanding.
    ///
    /// Only one may be in flight at a time. The rejected request does not
    /// touch the hardware; re-issue it once the running operation resolves.
    #[error("a seek or tune operation is already in progress")]
    TuneInProgress,

    /// Timed out waiting for the bus transport.
    #[error("timeout waiting for the bus")]
    Timeout,

    /// An invalid parameter was passed to the builder or a driver operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("bus arbitration lost".into());
        assert_eq!(e.to_string(), "bus transport error: bus arbitration lost");
    }

    #[test]
    fn error_display_disposed() {
        let e = Error::Disposed;
        assert_eq!(e.to_string(), "tuner has been shut down");
    }

    #[test]
    fn error_display_tune_in_progress() {
        let e = Error::TuneInProgress;
        assert_eq!(
            e.to_string(),
            "a seek or tune operation is already in progress"
        );
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for the bus");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("poll interval must be non-zero".into());
        assert_eq!(
            e.to_string(),
            "invalid parameter: poll interval must be non-zero"
        );
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
