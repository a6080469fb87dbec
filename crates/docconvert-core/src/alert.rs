//! Transient alerts
//!
//! At most one alert is visible. Showing a new one replaces the current one,
//! and the auto-dismiss timer of a replaced alert must not remove its
//! successor, so every alert carries an id.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    /// Bootstrap contextual class suffix
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Info => "bi-info-circle",
            Severity::Success => "bi-check-circle",
            Severity::Warning | Severity::Danger => "bi-exclamation-triangle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AlertId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: AlertId,
    pub message: String,
    pub severity: Severity,
}

impl Alert {
    /// Class list of the alert element
    pub fn class_name(&self) -> String {
        format!(
            "alert alert-{} alert-dismissible fade show alert-message",
            self.severity.as_str()
        )
    }
}

#[derive(Debug, Default)]
pub struct AlertPresenter {
    current: Option<AlertId>,
    next_id: u64,
}

impl AlertPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<AlertId> {
        self.current
    }

    /// Show a new alert; returns it and the id of the alert it replaces
    pub fn show(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
    ) -> (Alert, Option<AlertId>) {
        self.next_id += 1;
        let alert = Alert {
            id: AlertId(self.next_id),
            message: message.into(),
            severity,
        };
        let replaced = self.current.replace(alert.id);
        (alert, replaced)
    }

    /// Auto-dismiss timer elapsed for `id`
    ///
    /// Returns `true` if `id` was still the visible alert.
    pub fn expire(&mut self, id: AlertId) -> bool {
        if self.current == Some(id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_by_severity() {
        assert_eq!(Severity::Info.icon(), "bi-info-circle");
        assert_eq!(Severity::Success.icon(), "bi-check-circle");
        assert_eq!(Severity::Warning.icon(), "bi-exclamation-triangle");
        assert_eq!(Severity::Danger.icon(), "bi-exclamation-triangle");
    }

    #[test]
    fn test_new_alert_replaces_current() {
        let mut presenter = AlertPresenter::new();
        let (first, replaced) = presenter.show("one", Severity::Info);
        assert_eq!(replaced, None);

        let (second, replaced) = presenter.show("two", Severity::Danger);
        assert_eq!(replaced, Some(first.id));
        assert_eq!(presenter.current(), Some(second.id));
        assert_eq!(
            second.class_name(),
            "alert alert-danger alert-dismissible fade show alert-message"
        );
    }

    #[test]
    fn test_expiry_of_replaced_alert_keeps_successor() {
        let mut presenter = AlertPresenter::new();
        let (first, _) = presenter.show("one", Severity::Info);
        let (second, _) = presenter.show("two", Severity::Success);

        assert!(!presenter.expire(first.id));
        assert_eq!(presenter.current(), Some(second.id));

        assert!(presenter.expire(second.id));
        assert_eq!(presenter.current(), None);
    }
}
