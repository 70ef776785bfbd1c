/// Errors raised by the collection helpers and the session registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A weighted item carried a negative, NaN or infinite weight
    #[error("Invalid weight {weight} for item at index {index}")]
    InvalidWeight { index: usize, weight: f64 },

    /// The weights of a weighted choice summed to zero
    #[error("Weighted choice requires a total weight greater than zero")]
    NoPositiveWeight,

    /// Finite weights whose sum is not representable as a finite f64
    #[error("Total weight overflowed")]
    WeightOverflow,

    /// A duration was requested for a session with no recorded start
    #[error("No start time recorded for session {0}")]
    UnknownSession(String),
}

impl Error {
    /// Malformed input to a collection helper
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidWeight { .. } | Error::NoPositiveWeight | Error::WeightOverflow
        )
    }

    /// Lookup of something that is not (or no longer) tracked
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, Error::UnknownSession(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
