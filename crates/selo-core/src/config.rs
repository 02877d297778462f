// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{CaptureStrategy, Orientation, PageGeometry, PaperSize, PlatformFamily};

/// Pixels per millimetre at the CSS reference resolution (96 dpi).
pub const CSS_PX_PER_MM: f64 = 96.0 / 25.4;

/// Settings for the capture & export pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Paper size of the delivered document.
    pub paper_size: PaperSize,
    /// Orientation of the delivered document.
    pub orientation: Orientation,
    /// Device-pixel multiplier handed to the rasterizer.
    pub pixel_scale: f32,
    /// Opaque background colour painted behind the captured node.
    pub background: [u8; 3],
    /// Fraction of each page edge reserved as margin before fitting
    /// (0.05 reserves 5% per side). Zero fills the full page.
    pub margin_fraction: f64,
    /// Ratio used to convert page millimetres into raster pixel space.
    pub px_per_mm: f64,
    /// File name used when the request supplies an empty one.
    pub default_file_name: String,
    /// How the layout reconciler obtains its capture surface.
    pub capture_strategy: CaptureStrategy,
    /// Platform families whose share sheet silently fails for generated
    /// files; share requests on these fall back to download.
    pub unreliable_share_platforms: Vec<PlatformFamily>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Landscape,
            pixel_scale: 2.0,
            background: [255, 255, 255],
            margin_fraction: 0.0,
            px_per_mm: CSS_PX_PER_MM,
            default_file_name: "certificate.pdf".into(),
            capture_strategy: CaptureStrategy::DetachedClone,
            unreliable_share_platforms: vec![PlatformFamily::Ios],
        }
    }
}

impl ExportConfig {
    /// Physical geometry of the delivered page.
    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::from_paper(self.paper_size, self.orientation)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persist the config as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_a4_landscape() {
        let config = ExportConfig::default();
        let page = config.page_geometry();
        assert_eq!(page.width_mm, 297.0);
        assert_eq!(page.height_mm, 210.0);
    }

    #[test]
    fn default_denies_share_on_ios() {
        let config = ExportConfig::default();
        assert!(
            config
                .unreliable_share_platforms
                .contains(&PlatformFamily::Ios)
        );
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");

        let mut config = ExportConfig::default();
        config.margin_fraction = 0.05;
        config.persist(&path).expect("persist");

        let loaded = ExportConfig::load(&path).expect("load");
        assert_eq!(loaded.margin_fraction, 0.05);
        assert_eq!(loaded.default_file_name, "certificate.pdf");
    }
}
