// ABOUTME: Non-fatal problems noticed while a deploy runs.
// ABOUTME: Cleanup and notification failures land here instead of failing the deploy.

/// Warnings gathered over one command run, shown to the operator at the end.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Log and keep a warning.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = warning.kind.label(), "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn lock_release(message: impl Into<String>) -> Self {
        Self::new(WarningKind::LockRelease, message)
    }

    pub fn ssh_disconnect(message: impl Into<String>) -> Self {
        Self::new(WarningKind::SshDisconnect, message)
    }

    /// Deployment tracking failed or is not configured.
    pub fn external_notification(message: impl Into<String>) -> Self {
        Self::new(WarningKind::ExternalNotification, message)
    }

    /// The pre-deploy maintenance flag could not be put back.
    pub fn maintenance_restore(message: impl Into<String>) -> Self {
        Self::new(WarningKind::MaintenanceRestore, message)
    }

    /// A downloaded database dump was left on the target host.
    pub fn temp_cleanup(message: impl Into<String>) -> Self {
        Self::new(WarningKind::TempCleanup, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    LockRelease,
    SshDisconnect,
    ExternalNotification,
    MaintenanceRestore,
    TempCleanup,
}

impl WarningKind {
    /// Short name used in log fields.
    pub fn label(self) -> &'static str {
        match self {
            WarningKind::LockRelease => "lock_release",
            WarningKind::SshDisconnect => "ssh_disconnect",
            WarningKind::ExternalNotification => "external_notification",
            WarningKind::MaintenanceRestore => "maintenance_restore",
            WarningKind::TempCleanup => "temp_cleanup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::lock_release("rm exited with status 1"));
        diag.warn(Warning::external_notification("New Relic returned 500"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.warnings()[0].kind, WarningKind::LockRelease);
        assert!(diag.has(WarningKind::ExternalNotification));
        assert!(!diag.has(WarningKind::TempCleanup));
    }

    #[test]
    fn constructors_pick_kind() {
        assert_eq!(Warning::lock_release("x").kind, WarningKind::LockRelease);
        assert_eq!(Warning::ssh_disconnect("x").kind, WarningKind::SshDisconnect);
        assert_eq!(
            Warning::maintenance_restore("x").kind,
            WarningKind::MaintenanceRestore
        );
        assert_eq!(Warning::temp_cleanup("x").kind, WarningKind::TempCleanup);
    }
}
