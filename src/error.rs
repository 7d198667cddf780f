use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure raised by any peripheral acquire, write or release call.
#[derive(Debug, Error)]
pub enum PeripheralError {
    #[error("failed to acquire {device}")]
    Acquire {
        device: String,
        #[source]
        source: BoxError,
    },

    #[error("{op} failed on {device}")]
    Io {
        device: String,
        op: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("display position {0} is out of range")]
    InvalidPosition(usize),
}

impl PeripheralError {
    pub fn acquire<E>(device: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        PeripheralError::Acquire {
            device: device.into(),
            source: source.into(),
        }
    }

    pub fn io<E>(device: impl Into<String>, op: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        PeripheralError::Io {
            device: device.into(),
            op,
            source: source.into(),
        }
    }
}
