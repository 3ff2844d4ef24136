//! Observable operation state
//!
//! [`OperationResult`] is the state of one asynchronous fetch or mutation as
//! seen by an observer. Loading and error states keep the last good payload
//! so that observers can keep showing it: an error is an overlay, never a
//! destructive replacement of known-good data.

use super::errors::ShareError;

/// Loading / Success / Error state of an observable operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult<T> {
    /// A request is in flight
    Loading {
        /// Payload of the last successful request, if any
        last_known: Option<T>,
    },
    /// The latest request completed
    Success(T),
    /// The latest request failed
    Error {
        /// Original failure, preserved for display
        cause: ShareError,
        /// Payload of the last successful request, if any
        last_known: Option<T>,
    },
}

impl<T> OperationResult<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationResult::Loading { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationResult::Error { .. })
    }

    /// Payload to display: the success value or the last known one
    pub fn data(&self) -> Option<&T> {
        match self {
            OperationResult::Success(data) => Some(data),
            OperationResult::Loading { last_known } | OperationResult::Error { last_known, .. } => {
                last_known.as_ref()
            }
        }
    }

    /// Mutable access to the displayed payload, whatever the variant
    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            OperationResult::Success(data) => Some(data),
            OperationResult::Loading { last_known } | OperationResult::Error { last_known, .. } => {
                last_known.as_mut()
            }
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            OperationResult::Success(data) => Some(data),
            OperationResult::Loading { last_known } | OperationResult::Error { last_known, .. } => {
                last_known
            }
        }
    }

    pub fn error(&self) -> Option<&ShareError> {
        match self {
            OperationResult::Error { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
