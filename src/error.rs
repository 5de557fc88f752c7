//! Errors raised while running a poll cycle.

use reviewwatch_adapters::AdapterError;
use thiserror::Error;

/// Prefix of every failure report sent to the operator.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Everything that can go wrong inside one cycle.
///
/// Fetch and validation failures end the cycle. An unknown status only holds
/// back the affected homework. Both are reported through the error channel.
/// Delivery failures only delay the affected transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The status endpoint or the push channel failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A changed homework carries a status outside the known set.
    #[error("homework \"{name}\" has unknown review status \"{code}\"")]
    UnknownStatus { name: String, code: String },
}

impl MonitorError {
    /// Whether the push channel rejected a message.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, MonitorError::Adapter(AdapterError::DeliveryFailed(_)))
    }

    /// Whether a changed homework carried a status outside the known set.
    pub fn is_unknown_status(&self) -> bool {
        matches!(self, MonitorError::UnknownStatus { .. })
    }

    /// Render the text sent to the operator for this failure.
    pub fn report(&self) -> String {
        format!("{}: {}", FAILURE_PREFIX, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_text() {
        let err = MonitorError::from(AdapterError::UnexpectedStatusCode(500));
        assert_eq!(
            err.report(),
            "Сбой в работе программы: endpoint returned unexpected status code 500"
        );
    }

    #[test]
    fn test_unknown_status_report() {
        let err = MonitorError::UnknownStatus {
            name: "hw.zip".into(),
            code: "lost".into(),
        };
        assert_eq!(
            err.report(),
            "Сбой в работе программы: homework \"hw.zip\" has unknown review status \"lost\""
        );
    }

    #[test]
    fn test_delivery_failure_kind() {
        assert!(MonitorError::from(AdapterError::DeliveryFailed("x".into())).is_delivery_failure());
        assert!(!MonitorError::from(AdapterError::MissingField("homeworks".into()))
            .is_delivery_failure());
        assert!(MonitorError::UnknownStatus {
            name: "hw.zip".into(),
            code: "lost".into(),
        }
        .is_unknown_status());
    }
}
