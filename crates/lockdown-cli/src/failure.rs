use lockdown_core::AppError;

/// Which part of the program an error escaped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Client construction and template validation; nothing has changed yet.
    Startup,
    /// Collection and the two mutation phases.
    Run,
}

/// Renders the final error line for a failure raised during `stage`.
///
/// Errors raised before the core starts are always startup failures, whatever
/// their kind. During a run, configuration errors are still reported as
/// startup failures since they stop the run before any project is touched.
pub fn failure_message(stage: Stage, err: &anyhow::Error) -> String {
    let app = err.downcast_ref::<AppError>();
    let label = match (stage, app) {
        (Stage::Run, Some(app)) if app.is_hard_failure() => "Run aborted",
        (Stage::Run, None) => "Run aborted",
        _ => "Startup failed",
    };
    match app {
        Some(app) => format!("{}: {}", label, app.user_message()),
        None => format!("{}: {:#}", label, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_startup_http_status_is_startup_failure() {
        let err: anyhow::Error = AppError::HttpStatus {
            status: 500,
            url: "https://x.example/api/permissions/search_templates".to_string(),
        }
        .into();
        let msg = failure_message(Stage::Startup, &err);
        assert!(msg.starts_with("Startup failed: "));
        assert!(msg.contains("HTTP 500"));
    }

    #[test]
    fn test_startup_transport_error_is_startup_failure() {
        let err = Err::<(), _>(AppError::NetworkError("connection refused".to_string()))
            .context("Invalid service base URL")
            .unwrap_err();
        let msg = failure_message(Stage::Startup, &err);
        assert!(msg.starts_with("Startup failed: Network error"));
    }

    #[test]
    fn test_run_transport_error_is_run_aborted() {
        let err: anyhow::Error = AppError::Timeout(120_000).into();
        let msg = failure_message(Stage::Run, &err);
        assert!(msg.starts_with("Run aborted: "));
    }

    #[test]
    fn test_run_invalid_config_is_startup_failure() {
        let err: anyhow::Error = AppError::InvalidConfig("page size".to_string()).into();
        let msg = failure_message(Stage::Run, &err);
        assert!(msg.starts_with("Startup failed: "));
    }

    #[test]
    fn test_non_app_error_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("writing summary");
        let msg = failure_message(Stage::Run, &err);
        assert_eq!(msg, "Run aborted: writing summary: disk full");
    }
}
