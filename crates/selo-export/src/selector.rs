// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export channel selector — the orchestrator's lifecycle state cell and the
// share-capability probe that decides how a finished document reaches the
// user.
//
// Lifecycle: Idle → Capturing → (Downloading | Sharing) → Idle, with any
// failure path returning to Idle through the guard's drop.

use std::sync::{Arc, Mutex};

use selo_bridge::traits::ShareSheet;
use selo_core::config::ExportConfig;
use selo_core::error::{Result, SeloError};
use selo_core::types::{DeliveredVia, ExportMode, ExportPhase, PDF_MIME, PlatformFamily};
use tracing::{debug, info};

/// Observable lifecycle state owned by the orchestrator.
///
/// `begin` is the only entry point into an active phase, which is what makes
/// exports mutually exclusive: a second `begin` while the guard lives is
/// rejected, never queued.
#[derive(Debug, Clone)]
pub struct ExportState {
    phase: Arc<Mutex<ExportPhase>>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            phase: Arc::new(Mutex::new(ExportPhase::Idle)),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ExportPhase {
        *self.phase.lock().expect("phase lock poisoned")
    }

    /// Whether an export is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase().is_active()
    }

    /// Transition Idle → Capturing, or reject when already active.
    pub fn begin(&self) -> Result<PhaseGuard> {
        let mut phase = self.phase.lock().expect("phase lock poisoned");
        if phase.is_active() {
            return Err(SeloError::ExportInFlight);
        }
        *phase = ExportPhase::Capturing;
        Ok(PhaseGuard {
            phase: Arc::clone(&self.phase),
        })
    }
}

/// Live-export guard; resets the phase to Idle when dropped, so the busy
/// flag clears on success, error, and panic alike.
#[derive(Debug)]
pub struct PhaseGuard {
    phase: Arc<Mutex<ExportPhase>>,
}

impl PhaseGuard {
    /// Move to another active phase (Capturing → Downloading/Sharing).
    pub fn transition(&self, to: ExportPhase) {
        *self.phase.lock().expect("phase lock poisoned") = to;
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        *self.phase.lock().expect("phase lock poisoned") = ExportPhase::Idle;
    }
}

/// Decide which delivery channel handles this export.
///
/// Share is chosen only when the platform exposes a share capability, that
/// capability reports it can share a PDF file, and the platform family is
/// not known to have unreliable file-share support. Any probe failure falls
/// back to download so the user always ends up with the file.
pub fn select_channel<S: ShareSheet>(
    mode: ExportMode,
    sheet: &S,
    platform: PlatformFamily,
    config: &ExportConfig,
) -> DeliveredVia {
    match mode {
        ExportMode::Download => DeliveredVia::Download,
        ExportMode::Share => {
            if !sheet.share_available() {
                debug!("no native share capability, falling back to download");
                return DeliveredVia::Download;
            }
            if !sheet.can_share_files(PDF_MIME) {
                debug!("share capability cannot take PDF files, falling back to download");
                return DeliveredVia::Download;
            }
            if config.unreliable_share_platforms.contains(&platform) {
                info!(
                    ?platform,
                    "file share known unreliable on this platform, falling back to download"
                );
                return DeliveredVia::Download;
            }
            DeliveredVia::Share
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selo_bridge::headless::HeadlessBridge;

    #[test]
    fn begin_moves_to_capturing_and_drop_returns_to_idle() {
        let state = ExportState::new();
        assert_eq!(state.phase(), ExportPhase::Idle);

        {
            let guard = state.begin().expect("begin");
            assert_eq!(state.phase(), ExportPhase::Capturing);
            guard.transition(ExportPhase::Downloading);
            assert_eq!(state.phase(), ExportPhase::Downloading);
        }
        assert_eq!(state.phase(), ExportPhase::Idle);
    }

    #[test]
    fn second_begin_is_rejected_while_guard_lives() {
        let state = ExportState::new();
        let _guard = state.begin().expect("first begin");
        assert!(matches!(state.begin(), Err(SeloError::ExportInFlight)));
    }

    #[test]
    fn begin_succeeds_again_after_release() {
        let state = ExportState::new();
        drop(state.begin().expect("first begin"));
        assert!(state.begin().is_ok());
    }

    #[test]
    fn download_mode_never_probes() {
        let bridge = HeadlessBridge::new();
        let config = ExportConfig::default();
        let channel = select_channel(
            ExportMode::Download,
            &bridge,
            PlatformFamily::Desktop,
            &config,
        );
        assert_eq!(channel, DeliveredVia::Download);
    }

    #[test]
    fn share_falls_back_when_capability_is_missing() {
        let bridge = HeadlessBridge::new();
        let config = ExportConfig::default();
        let channel =
            select_channel(ExportMode::Share, &bridge, PlatformFamily::Desktop, &config);
        assert_eq!(channel, DeliveredVia::Download);
    }

    #[test]
    fn share_falls_back_when_files_cannot_be_shared() {
        let bridge = HeadlessBridge::new();
        bridge.set_share_support(true, false);
        let config = ExportConfig::default();
        let channel =
            select_channel(ExportMode::Share, &bridge, PlatformFamily::Desktop, &config);
        assert_eq!(channel, DeliveredVia::Download);
    }

    #[test]
    fn share_falls_back_on_unreliable_platforms() {
        let bridge = HeadlessBridge::new();
        bridge.set_share_support(true, true);
        let config = ExportConfig::default();
        let channel = select_channel(ExportMode::Share, &bridge, PlatformFamily::Ios, &config);
        assert_eq!(channel, DeliveredVia::Download);
    }

    #[test]
    fn share_is_selected_when_every_probe_passes() {
        let bridge = HeadlessBridge::new();
        bridge.set_share_support(true, true);
        let config = ExportConfig::default();
        let channel =
            select_channel(ExportMode::Share, &bridge, PlatformFamily::Android, &config);
        assert_eq!(channel, DeliveredVia::Share);
    }
}
