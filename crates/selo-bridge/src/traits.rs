// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The export pipeline never talks to a real DOM, file system dialog, or
// share sheet directly. The bridge traits provide abstractions for
// platform-specific implementations; the in-repo `HeadlessBridge` serves
// desktop/CI builds, and host applications supply browser or mobile
// implementations.

use selo_core::error::Result;
use selo_core::types::{CaptureTarget, PageGeometry, PlatformFamily, RasterImage};

/// Unified bridge that groups all capabilities one export needs.
pub trait ExportBridge: LayoutHost + Rasterizer + FileSink + ShareSheet {
    /// Identify the platform hosting the visual tree.
    fn platform(&self) -> PlatformInfo;
}

/// Access to the visual tree that owns the capture targets.
///
/// Implementations map their own layout units onto millimetres; the pipeline
/// treats snapshots as values to round-trip, never interpreting them.
pub trait LayoutHost {
    /// Whether the target currently exists in the visual tree.
    fn is_mounted(&self, target: &CaptureTarget) -> bool;

    /// Record the target's layout-affecting properties.
    fn snapshot_layout(&self, target: &CaptureTarget) -> Result<LayoutSnapshot>;

    /// Force the target's box to the exact physical page dimensions.
    ///
    /// Also clears any collapsed-for-mobile marker: a collapsed node has
    /// zero captured content.
    fn apply_page_layout(&self, target: &CaptureTarget, page: &PageGeometry) -> Result<()>;

    /// Write a previously recorded snapshot back onto the target.
    fn restore_layout(&self, target: &CaptureTarget, snapshot: &LayoutSnapshot) -> Result<()>;

    /// Clone the target into a detached node positioned off-screen.
    fn clone_detached(&self, target: &CaptureTarget) -> Result<CaptureTarget>;

    /// Remove a detached clone from the tree. Unknown handles are ignored.
    fn discard_detached(&self, target: &CaptureTarget);

    /// The measured size of the target's box in millimetres.
    fn measured_size_mm(&self, target: &CaptureTarget) -> Result<(f64, f64)>;

    /// Wait one rendering frame so the layout engine settles.
    async fn settle_frame(&self);
}

/// Snapshot of the layout-affecting properties of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub width_mm: Option<f64>,
    pub max_width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub max_height_mm: Option<f64>,
    /// Whether the node carried the collapsed-for-mobile marker.
    pub collapsed: bool,
}

/// Options handed to the rasterizer for one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device-pixel multiplier applied to the node's layout size.
    pub pixel_scale: f32,
    /// Whether cross-origin images inside the node may be drawn.
    pub cross_origin_images: bool,
    /// Opaque colour painted behind transparent regions.
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            pixel_scale: 2.0,
            cross_origin_images: true,
            background: [255, 255, 255],
        }
    }
}

/// Converts a visual subtree into a bitmap.
///
/// The pipeline depends on this capability but does not implement real
/// rendering; browser hosts typically bind an HTML canvas capture here.
pub trait Rasterizer {
    async fn rasterize(
        &self,
        target: &CaptureTarget,
        options: &CaptureOptions,
    ) -> Result<RasterImage>;
}

/// Result of handing a document to the save-to-file delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
    /// Where the file landed, when the platform can tell.
    pub location: Option<String>,
}

/// Hand a finished document to the platform's save mechanism.
pub trait FileSink {
    async fn save_file(&self, file_name: &str, mime_type: &str, bytes: &[u8])
    -> Result<SavedFile>;
}

/// Everything the native share sheet needs for one document.
#[derive(Debug, Clone)]
pub struct SharePayload<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

/// Share a document with other apps via the OS share sheet.
pub trait ShareSheet {
    /// Whether the platform exposes a native share capability at all.
    fn share_available(&self) -> bool;

    /// Whether the capability explicitly reports it can share a file of
    /// this type.
    fn can_share_files(&self, mime_type: &str) -> bool;

    /// Present the share sheet with the given payload.
    ///
    /// Returns `Ok(())` once the sheet was presented and dismissed; a user
    /// cancellation surfaces as `SeloError::ShareRejected`.
    async fn share(&self, payload: SharePayload<'_>) -> Result<()>;
}

/// Identity of the platform hosting the visual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub family: PlatformFamily,
    /// Human-readable platform name (e.g. "iOS 17", "Headless").
    pub name: String,
}
