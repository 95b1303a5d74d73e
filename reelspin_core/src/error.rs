/// Errors raised by the reel generator and payline evaluator.
///
/// `Configuration` marks a defect in the symbol tables or grid shape and is
/// fatal to the spin. `InvalidArgument` marks an out-of-range value passed
/// directly to the core by a caller that skipped its own validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SlotError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SlotError::Configuration(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SlotError::InvalidArgument(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, SlotError::Configuration(_))
    }
}

pub type SlotResult<T> = Result<T, SlotError>;
