//! Error types for the RouterOS client

use std::time::Duration;

use thiserror::Error;

/// Unified error type for device access.
///
/// Variants are split along the line callers branch on: transport failures
/// (`Connection`, `Timeout`) mean the connection is gone and a fallback
/// transport may be attempted; `Device` means the command itself was
/// rejected but the session is still usable; `FatalDevice` ends the session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket could not be opened, or was dropped mid-exchange
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// A bounded socket or process wait expired
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Login handshake rejected by the device
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Command transported successfully but rejected by the device (`!trap`)
    #[error("device error: {message}")]
    Device { message: String },

    /// Device signalled `!fatal`; the connection must not be reused
    #[error("fatal device error: {message}")]
    FatalDevice { message: String },

    /// Invalid device configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// External SSH process could not be spawned or waited on
    #[error("process error: {0}")]
    Process(String),
}

impl ClientError {
    /// Whether the connection that produced this error must be discarded.
    ///
    /// `Device` errors are deliberately excluded: a `!trap` reply leaves the
    /// session usable for subsequent commands.
    #[must_use]
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::FatalDevice { .. }
        )
    }

    pub(crate) fn closed(context: &str) -> Self {
        Self::Connection(std::io::Error::new(
            std::io::ErrorKind::ConnectionAborted,
            context.to_string(),
        ))
    }
}

/// Convenient alias for Result with client error
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = ClientError::Device {
            message: "no such command".to_string(),
        };
        assert_eq!(err.to_string(), "device error: no such command");
    }

    #[test]
    fn test_authentication_error_display() {
        let err = ClientError::Authentication {
            message: "invalid user name or password".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed: invalid user name or password"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: ClientError = io_err.into();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[test]
    fn test_connection_fatal_classification() {
        assert!(ClientError::Timeout(Duration::from_secs(15)).is_connection_fatal());
        assert!(
            ClientError::FatalDevice {
                message: "session terminated".to_string()
            }
            .is_connection_fatal()
        );
        assert!(ClientError::closed("poisoned").is_connection_fatal());
        assert!(
            !ClientError::Device {
                message: "no such command".to_string()
            }
            .is_connection_fatal()
        );
        assert!(
            !ClientError::Authentication {
                message: "denied".to_string()
            }
            .is_connection_fatal()
        );
    }
}
