use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// A single rejected field on a submitted deal or comment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a non-negative number")]
    InvalidAmount(&'static str),

    #[error("original price must not be lower than price")]
    OriginalBelowPrice,

    #[error("discount must be between 0 and 100")]
    DiscountOutOfRange,

    #[error("{0} is too long (max {1} characters)")]
    TooLong(&'static str, usize),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field)
            | ValidationError::InvalidAmount(field)
            | ValidationError::TooLong(field, _) => field,
            ValidationError::OriginalBelowPrice => "original_price",
            ValidationError::DiscountOutOfRange => "discount",
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationError", 2)?;
        state.serialize_field("field", self.field())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
