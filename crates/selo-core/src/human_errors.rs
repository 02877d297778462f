// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the host UI.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::SeloError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Momentary problem — trying again is likely to work.
    Transient,
    /// User must do something first.
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the action is worth retrying.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `SeloError` into a `HumanError` the host UI can present.
pub fn humanize_error(err: &SeloError) -> HumanError {
    match err {
        SeloError::TargetNotMounted => HumanError {
            message: "The certificate isn't ready yet.".into(),
            suggestion: "Wait for the preview to finish loading, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::ExportInFlight => HumanError {
            message: "Your certificate is still being generated.".into(),
            suggestion: "Please wait a moment for the current export to finish.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::CaptureFailed(_) => HumanError {
            message: "We couldn't capture the certificate.".into(),
            suggestion: "Make sure the preview is visible on screen, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::Layout(_) => HumanError {
            message: "The certificate layout couldn't be prepared.".into(),
            suggestion: "Reload the page and try the export again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::Pdf(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "Try generating the certificate again. If it keeps failing, reload the page.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::Image(_) => HumanError {
            message: "There's a problem with the captured image.".into(),
            suggestion: "Try the export again with the preview fully visible.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::ShareRejected(_) => HumanError {
            message: "Sharing didn't complete.".into(),
            suggestion: "You can download the certificate instead.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        SeloError::DeliveryFailed(_) => HumanError {
            message: "The file couldn't be saved.".into(),
            suggestion: "Check that your device has free space and downloads are allowed, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        SeloError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Use the download button instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SeloError::Io(_) => HumanError {
            message: "A file operation failed.".into(),
            suggestion: "Check your device storage and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SeloError::Serialization(_) => HumanError {
            message: "Settings couldn't be read.".into(),
            suggestion: "Reset the export settings to their defaults.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_error_is_transient_and_retriable() {
        let human = humanize_error(&SeloError::ExportInFlight);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn platform_unavailable_is_permanent() {
        let human = humanize_error(&SeloError::PlatformUnavailable);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn every_message_carries_a_suggestion() {
        let errors = [
            SeloError::TargetNotMounted,
            SeloError::ExportInFlight,
            SeloError::CaptureFailed("x".into()),
            SeloError::Layout("x".into()),
            SeloError::Pdf("x".into()),
            SeloError::Image("x".into()),
            SeloError::ShareRejected("x".into()),
            SeloError::DeliveryFailed("x".into()),
            SeloError::PlatformUnavailable,
        ];
        for err in &errors {
            let human = humanize_error(err);
            assert!(!human.message.is_empty());
            assert!(!human.suggestion.is_empty());
        }
    }
}
