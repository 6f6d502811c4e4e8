//! Reporting of soft failures: calls that completed with a failing status.

use tracing::warn;

use crate::models::OperationOutcome;

/// Renders one message per failing outcome, in input order.
pub fn failure_messages<F>(outcomes: &[OperationOutcome], message: F) -> Vec<String>
where
    F: Fn(u16, &str) -> String,
{
    outcomes
        .iter()
        .filter(|o| o.is_failure())
        .map(|o| message(o.status_code, &o.identifier))
        .collect()
}

/// Logs a warning for every failing outcome and returns how many were logged.
///
/// Never fails. Callers carry on regardless of the count.
///
/// # Examples
///
/// ```
/// use lockdown_core::models::OperationOutcome;
/// use lockdown_core::report::report_failures;
///
/// let outcomes = vec![
///     OperationOutcome::new(204, "alpha"),
///     OperationOutcome::new(404, "beta"),
/// ];
/// let reported = report_failures(&outcomes, |status, key| {
///     format!("{} answered HTTP {}", key, status)
/// });
/// assert_eq!(reported, 1);
/// ```
pub fn report_failures<F>(outcomes: &[OperationOutcome], message: F) -> usize
where
    F: Fn(u16, &str) -> String,
{
    let messages = failure_messages(outcomes, message);
    for msg in &messages {
        warn!("{}", msg);
    }
    messages.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(status: u16, id: &str) -> String {
        format!("batch {} failed with HTTP {}", id, status)
    }

    #[test]
    fn test_no_messages_when_all_succeed() {
        let outcomes = vec![
            OperationOutcome::new(200, "1"),
            OperationOutcome::new(204, "2"),
            OperationOutcome::new(299, "3"),
        ];
        assert!(failure_messages(&outcomes, template).is_empty());
        assert_eq!(report_failures(&outcomes, template), 0);
    }

    #[test]
    fn test_one_message_per_failure() {
        let outcomes = vec![
            OperationOutcome::new(204, "1"),
            OperationOutcome::new(404, "2"),
            OperationOutcome::new(204, "3"),
            OperationOutcome::new(500, "4"),
            OperationOutcome::new(300, "5"),
        ];
        let messages = failure_messages(&outcomes, template);
        assert_eq!(
            messages,
            vec![
                "batch 2 failed with HTTP 404",
                "batch 4 failed with HTTP 500",
                "batch 5 failed with HTTP 300",
            ]
        );
        assert_eq!(report_failures(&outcomes, template), 3);
    }

    #[test]
    fn test_empty_outcomes() {
        assert_eq!(report_failures(&[], template), 0);
    }
}
