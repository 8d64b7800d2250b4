//! Store middleware
//!
//! Middleware sees every action before the reducers do and may answer
//! with follow-up actions, which the store dispatches afterwards.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::CANCELLED_MESSAGE;
use crate::store::action::{Action, AsyncPhase, Rejection, ServiceAction, UiAction};
use crate::types::{BulkDeleteOutcome, Notification, NotificationKind};

const ABORTED_MESSAGE: &str = "Aborted";
const NOT_FOUND_DURATION: Duration = Duration::from_millis(5000);
const DEFAULT_DURATION: Duration = Duration::from_millis(7000);

pub trait Middleware: Send + Sync {
    fn on_action(&self, action: &Action) -> Vec<Action>;
}

/// Turn a rejected operation into the notification the user should see.
/// Cancellations are expected and produce nothing.
pub fn classify(rejection: &Rejection) -> Option<Notification> {
    if rejection.message == CANCELLED_MESSAGE || rejection.message == ABORTED_MESSAGE {
        return None;
    }

    let notification = match rejection.status {
        Some(401) => Notification::new(
            NotificationKind::Error,
            "Authentication Required",
            "Please log in to continue.",
            None,
        ),
        Some(403) => Notification::new(
            NotificationKind::Error,
            "Access Denied",
            "You do not have permission to perform this action.",
            None,
        ),
        Some(404) => Notification::new(
            NotificationKind::Warning,
            "Not Found",
            "The requested resource was not found.",
            Some(NOT_FOUND_DURATION),
        ),
        Some(status) if status >= 500 => Notification::new(
            NotificationKind::Error,
            "Server Error",
            "A server error occurred. Please try again later.",
            None,
        ),
        _ => {
            let message = if rejection.message.trim().is_empty() {
                "An unexpected error occurred"
            } else {
                rejection.message.as_str()
            };
            Notification::new(NotificationKind::Error, "Error", message, Some(DEFAULT_DURATION))
        }
    };
    Some(notification)
}

fn partial_delete_warning(outcome: &BulkDeleteOutcome) -> Notification {
    let mut message = format!(
        "Deleted {} of {} services.",
        outcome.response.deleted_count,
        outcome.requested_ids.len()
    );
    if !outcome.response.failed_ids.is_empty() {
        let ids: Vec<String> = outcome.response.failed_ids.iter().map(|id| id.to_string()).collect();
        message.push_str(&format!(" Not deleted: {}.", ids.join(", ")));
    }
    Notification::new(NotificationKind::Warning, "Partial Delete", message, Some(DEFAULT_DURATION))
}

/// Raises a notification for every rejected async action and for bulk
/// deletes that removed fewer services than requested
#[derive(Debug, Default)]
pub struct ErrorNotificationMiddleware;

impl Middleware for ErrorNotificationMiddleware {
    fn on_action(&self, action: &Action) -> Vec<Action> {
        if let Some(rejection) = action.rejection() {
            return match classify(rejection) {
                Some(notification) => {
                    warn!("{} ({:?}): {}", action.name(), rejection.status, rejection.message);
                    vec![Action::Ui(UiAction::AddNotification(notification))]
                }
                None => {
                    debug!("{} cancelled", action.name());
                    Vec::new()
                }
            };
        }

        if let Action::Service(ServiceAction::BulkDelete(AsyncPhase::Fulfilled(outcome))) = action {
            if outcome.is_partial() {
                return vec![Action::Ui(UiAction::AddNotification(partial_delete_warning(outcome)))];
            }
        }

        Vec::new()
    }
}

/// Traces every dispatched action
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn on_action(&self, action: &Action) -> Vec<Action> {
        debug!("dispatch {}", action.name());
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::action::ExportAction;
    use crate::types::BulkDeleteResponse;

    fn notification_for(status: Option<u16>, message: &str) -> Option<Notification> {
        classify(&Rejection::new(message, status))
    }

    #[test]
    fn test_auth_and_server_errors_are_persistent() {
        for (status, title) in [
            (401, "Authentication Required"),
            (403, "Access Denied"),
            (500, "Server Error"),
            (503, "Server Error"),
        ] {
            let n = notification_for(Some(status), "x").unwrap();
            assert_eq!(n.title, title);
            assert_eq!(n.kind, NotificationKind::Error);
            assert_eq!(n.duration, None);
        }
    }

    #[test]
    fn test_not_found_is_short_warning() {
        let n = notification_for(Some(404), "missing").unwrap();
        assert_eq!(n.kind, NotificationKind::Warning);
        assert_eq!(n.title, "Not Found");
        assert_eq!(n.duration, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_other_errors_show_raw_message() {
        let n = notification_for(Some(422), "Service code already exists").unwrap();
        assert_eq!(n.title, "Error");
        assert_eq!(n.message, "Service code already exists");
        assert_eq!(n.duration, Some(Duration::from_secs(7)));

        let n = notification_for(None, "").unwrap();
        assert_eq!(n.message, "An unexpected error occurred");
    }

    #[test]
    fn test_cancellation_is_silent() {
        assert!(notification_for(None, "Request cancelled").is_none());
        assert!(notification_for(None, "Aborted").is_none());
    }

    #[test]
    fn test_middleware_emits_notification_for_rejection() {
        let action = Action::Export(ExportAction::Start(AsyncPhase::Rejected(Rejection::new(
            "Forbidden",
            Some(403),
        ))));

        let follow_ups = ErrorNotificationMiddleware.on_action(&action);

        assert_eq!(follow_ups.len(), 1);
        assert!(matches!(
            &follow_ups[0],
            Action::Ui(UiAction::AddNotification(n)) if n.title == "Access Denied"
        ));
    }

    #[test]
    fn test_middleware_ignores_success() {
        let action = Action::Service(ServiceAction::Delete(AsyncPhase::Fulfilled(1)));
        assert!(ErrorNotificationMiddleware.on_action(&action).is_empty());
    }

    #[test]
    fn test_partial_bulk_delete_warns() {
        let outcome = BulkDeleteOutcome {
            requested_ids: vec![1, 2, 3],
            response: BulkDeleteResponse {
                deleted_count: 2,
                failed_ids: vec![3],
                errors: vec![],
            },
        };
        let action = Action::Service(ServiceAction::BulkDelete(AsyncPhase::Fulfilled(outcome)));

        let follow_ups = ErrorNotificationMiddleware.on_action(&action);

        match &follow_ups[..] {
            [Action::Ui(UiAction::AddNotification(n))] => {
                assert_eq!(n.title, "Partial Delete");
                assert_eq!(n.message, "Deleted 2 of 3 services. Not deleted: 3.");
            }
            other => panic!("unexpected follow-ups: {:?}", other),
        }
    }
}
