// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture orchestrator — the façade the presentation layer calls.
//
// Owns the export lifecycle: busy state, layout reconciliation, capture,
// fitting, assembly, and delivery. Every error is contained here; callers
// see a `Result`, never a half-finished document or a stuck busy flag.

use chrono::Utc;
use selo_bridge::traits::{CaptureOptions, ExportBridge, SharePayload};
use selo_core::config::ExportConfig;
use selo_core::error::{Result, SeloError};
use selo_core::types::{
    CaptureTarget, DeliveredVia, ExportId, ExportMode, ExportPhase, ExportReceipt, ExportRequest,
    PDF_MIME,
};
use selo_document::DocumentAssembler;
use selo_document::fit::fit_with_margin;
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument, warn};

use crate::reconciler::CaptureSurface;
use crate::selector::{ExportState, select_channel};

/// Runs the full capture → rasterize → fit → assemble → deliver pipeline
/// for one capture target.
///
/// Exposes exactly two operations: [`generate`](Exporter::generate) and
/// [`share`](Exporter::share). Both are safe to call repeatedly but mutually
/// exclusive while one export is in flight.
pub struct Exporter<B: ExportBridge> {
    bridge: B,
    config: ExportConfig,
    state: ExportState,
}

impl<B: ExportBridge> Exporter<B> {
    pub fn new(bridge: B) -> Self {
        Self::with_config(bridge, ExportConfig::default())
    }

    pub fn with_config(bridge: B, config: ExportConfig) -> Self {
        Self {
            bridge,
            config,
            state: ExportState::new(),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Current lifecycle phase, for the host UI's busy indicator.
    pub fn phase(&self) -> ExportPhase {
        self.state.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Whether the platform exposes a native share capability at all.
    ///
    /// Hosts use this to decide whether to render a share button; the full
    /// reliability probe still runs per export.
    pub fn share_supported(&self) -> bool {
        self.bridge.share_available()
    }

    /// Produce the document and hand it to the save-to-file delivery.
    #[instrument(skip_all, fields(node = %target, file = %request.file_name))]
    pub async fn generate(
        &self,
        target: &CaptureTarget,
        request: &ExportRequest,
    ) -> Result<ExportReceipt> {
        self.run(target, request, ExportMode::Download).await
    }

    /// Produce the document and offer the native share sheet, falling back
    /// to download when the capability probe fails.
    #[instrument(skip_all, fields(node = %target, file = %request.file_name))]
    pub async fn share(
        &self,
        target: &CaptureTarget,
        request: &ExportRequest,
    ) -> Result<ExportReceipt> {
        self.run(target, request, ExportMode::Share).await
    }

    async fn run(
        &self,
        target: &CaptureTarget,
        request: &ExportRequest,
        mode: ExportMode,
    ) -> Result<ExportReceipt> {
        let id = ExportId::new();
        let started_at = Utc::now();

        // Busy gate: the guard returns the state to Idle on every exit path.
        let guard = self.state.begin()?;

        let document = match self.build_document(target, request).await {
            Ok(document) => document,
            Err(err) => {
                error!(export = %id, error = %err, "certificate capture failed");
                return Err(err);
            }
        };

        let file_name = request
            .effective_file_name(&self.config.default_file_name)
            .to_owned();
        let channel = select_channel(
            mode,
            &self.bridge,
            self.bridge.platform().family,
            &self.config,
        );

        match channel {
            DeliveredVia::Download => {
                guard.transition(ExportPhase::Downloading);
                if let Err(err) = self
                    .bridge
                    .save_file(&file_name, PDF_MIME, &document)
                    .await
                {
                    error!(export = %id, error = %err, "file delivery failed");
                    return Err(err);
                }
            }
            DeliveredVia::Share => {
                guard.transition(ExportPhase::Sharing);
                let payload = SharePayload {
                    title: request.effective_title(),
                    text: request.effective_share_text(),
                    file_name: &file_name,
                    mime_type: PDF_MIME,
                    bytes: &document,
                };
                if let Err(err) = self.bridge.share(payload).await {
                    // A dismissed share sheet is not a pipeline defect.
                    warn!(export = %id, error = %err, "share sheet rejected the document");
                }
            }
        }

        let sha256 = digest(&document);
        info!(
            export = %id,
            ?channel,
            file = %file_name,
            bytes = document.len(),
            %sha256,
            "certificate exported"
        );

        Ok(ExportReceipt {
            id,
            file_name,
            channel,
            document,
            sha256,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Capture, fit, and assemble — the part of the pipeline that touches
    /// the visual tree. The on-screen layout is restored before this
    /// function returns, on success and failure alike.
    async fn build_document(
        &self,
        target: &CaptureTarget,
        request: &ExportRequest,
    ) -> Result<Vec<u8>> {
        let page = self.config.page_geometry();

        let surface = CaptureSurface::acquire(
            &self.bridge,
            target,
            &page,
            self.config.capture_strategy,
        )
        .await?;

        let options = CaptureOptions {
            pixel_scale: self.config.pixel_scale,
            cross_origin_images: true,
            background: self.config.background,
        };
        let raster = self.bridge.rasterize(surface.node(), &options).await?;

        // Release the surface before the pure geometry work: the on-screen
        // preview must be back in shape before anything else can fail.
        drop(surface);

        let page_px = page.to_pixels(self.config.px_per_mm);
        let placement = fit_with_margin(&raster, page_px, self.config.margin_fraction)
            .ok_or_else(|| SeloError::CaptureFailed("captured raster has no content".into()))?;

        let mut assembler = DocumentAssembler::new(page, self.config.px_per_mm);
        assembler.set_title(request.effective_title());
        assembler.assemble(&raster, &placement)
    }
}

/// SHA-256 hex fingerprint of the produced document.
fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
