//! Error taxonomy shared by every CanvAnim crate.
//!
//! Validation is always local and happens before any mutation. A selector
//! that matches nothing is not an error: it resolves to an empty list.

use crate::id::ItemId;
use crate::item::ItemType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A public operation received a value of the wrong shape
    /// (non-finite coordinate, reserved tag name, malformed pattern...).
    #[error("{operation}: argument `{argument}` {reason}")]
    ArgumentType {
        operation: &'static str,
        argument: &'static str,
        reason: String,
    },

    /// An item-only operation was issued against an item that cannot carry it.
    #[error("{operation}: not supported by {kind} item {item}")]
    UnsupportedOperation {
        operation: &'static str,
        item: ItemId,
        kind: ItemType,
    },

    /// An event name that is not part of the closed event set.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    /// The id does not belong to any item currently in the scene.
    #[error("no item {0} in the scene")]
    UnknownItem(ItemId),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn argument(
        operation: &'static str,
        argument: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Error::ArgumentType {
            operation,
            argument,
            reason: reason.into(),
        }
    }
}

/// Reject NaN and infinities; every coordinate the scene stores is finite.
pub fn ensure_finite(operation: &'static str, argument: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::argument(operation, argument, format!("is not a finite number ({value})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass_through() {
        assert_eq!(ensure_finite("Scene::move", "dx", 3.5), Ok(3.5));
    }

    #[test]
    fn nan_is_an_argument_error() {
        let err = ensure_finite("Scene::create_line", "x1", f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentType {
                operation: "Scene::create_line",
                argument: "x1",
                ..
            }
        ));
        assert!(err.to_string().starts_with("Scene::create_line: argument `x1`"));
    }
}
