// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Selo certificate export pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// MIME type of every document this pipeline produces.
pub const PDF_MIME: &str = "application/pdf";

/// Handle to exactly one visual node owned by the presentation layer.
///
/// The pipeline borrows a target for the duration of one export and must not
/// retain it beyond that call. At most one export may be in flight against a
/// given target at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureTarget(pub Uuid);

impl CaptureTarget {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one export attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportId(pub Uuid);

impl ExportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait orientation.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Physical page geometry in millimetres.
///
/// Distinct from the on-screen preview geometry: the preview uses its own,
/// slightly non-standard dimensions for responsive layout, and the two are
/// never assumed equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageGeometry {
    /// Geometry of a standard paper size in the given orientation.
    pub fn from_paper(paper: PaperSize, orientation: Orientation) -> Self {
        let (w, h) = paper.dimensions_mm();
        let (w, h) = (f64::from(w), f64::from(h));
        match orientation {
            Orientation::Portrait => Self {
                width_mm: w,
                height_mm: h,
            },
            Orientation::Landscape => Self {
                width_mm: h,
                height_mm: w,
            },
        }
    }

    /// The delivered-document default: A4 landscape.
    pub fn a4_landscape() -> Self {
        Self::from_paper(PaperSize::A4, Orientation::Landscape)
    }

    /// The on-screen responsive preview's own physical dimensions.
    ///
    /// Deliberately not a standard paper size — the preview is sized to the
    /// certificate artwork, not to the printed page.
    pub fn screen_preview() -> Self {
        Self {
            width_mm: 279.168,
            height_mm: 174.979,
        }
    }

    /// Convert to raster pixel space at a fixed pixels-per-millimetre ratio.
    pub fn to_pixels(&self, px_per_mm: f64) -> PagePixels {
        PagePixels {
            width: self.width_mm * px_per_mm,
            height: self.height_mm * px_per_mm,
        }
    }
}

/// A page expressed in the same pixel space as a captured raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePixels {
    pub width: f64,
    pub height: f64,
}

/// Bitmap produced by one capture attempt.
///
/// Pixel data is tightly-packed RGBA8, row-major. Created once per export,
/// consumed by the page fitter, then discardable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer, checking that its length matches the dimensions.
    pub fn from_rgba8(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, crate::error::SeloError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(crate::error::SeloError::Image(format!(
                "pixel buffer length {} does not match {width}x{height} RGBA8 (expected {expected})",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Whether the raster carries no content (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Uniform scale-to-fit placement of a raster on a page, in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
}

/// How the finished document should reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportMode {
    /// Hand the file to the platform's save mechanism.
    Download,
    /// Offer the native share sheet, falling back to download.
    Share,
}

/// One user-initiated export. Short-lived, created per action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Output file name, used verbatim for both download and share.
    pub file_name: String,
    /// Title shown by the share sheet and embedded as PDF metadata.
    pub title: String,
    /// Body text for the share sheet.
    pub share_text: String,
    pub mode: ExportMode,
}

impl ExportRequest {
    /// A download request with the given file name.
    pub fn download(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            title: String::new(),
            share_text: String::new(),
            mode: ExportMode::Download,
        }
    }

    /// A share request with the given file name, title, and body text.
    pub fn share(
        file_name: impl Into<String>,
        title: impl Into<String>,
        share_text: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            title: title.into(),
            share_text: share_text.into(),
            mode: ExportMode::Share,
        }
    }

    /// The file name to deliver under, never empty.
    pub fn effective_file_name<'a>(&'a self, default: &'a str) -> &'a str {
        if self.file_name.trim().is_empty() {
            default
        } else {
            &self.file_name
        }
    }

    /// Share-sheet title, never empty.
    pub fn effective_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Certificate"
        } else {
            &self.title
        }
    }

    /// Share-sheet body text, never empty.
    pub fn effective_share_text(&self) -> &str {
        if self.share_text.trim().is_empty() {
            "Generated certificate"
        } else {
            &self.share_text
        }
    }
}

/// Which delivery channel actually handled the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveredVia {
    Download,
    Share,
}

/// Successful outcome of one export: the finished document plus provenance.
///
/// Never partially populated — an export either produces a complete receipt
/// or an error.
#[derive(Debug, Clone)]
pub struct ExportReceipt {
    pub id: ExportId,
    /// File name the document was delivered under.
    pub file_name: String,
    pub channel: DeliveredVia,
    /// The serialized PDF.
    pub document: Vec<u8>,
    /// SHA-256 hex digest of `document`.
    pub sha256: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Observable lifecycle state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPhase {
    /// No export in progress; both user actions enabled.
    Idle,
    /// Layout reconciliation, rasterization, fitting, and assembly running.
    Capturing,
    /// Binary being handed to the save-to-file delivery.
    Downloading,
    /// Binary being handed to the native share sheet.
    Sharing,
}

impl ExportPhase {
    /// Whether an export is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Broad platform family, used for share reliability decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformFamily {
    Ios,
    Android,
    Desktop,
    Web,
}

/// How the layout reconciler obtains a capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStrategy {
    /// Capture a detached off-screen clone; the visible node is never touched.
    DetachedClone,
    /// Mutate the live node and restore its snapshot afterwards.
    InPlace,
}
