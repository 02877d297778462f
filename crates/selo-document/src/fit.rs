// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page fitter — uniform scale-to-fit placement of a raster on a page.
//
// Pure geometry, no side effects. The page must already be expressed in the
// raster's pixel space (see `PageGeometry::to_pixels`); the assembler owns
// all conversion back to physical units.

use selo_core::types::{FitResult, PagePixels, RasterImage};

/// Compute the uniform scale and centred placement that makes `raster` fill
/// `page` without distortion or clipping.
///
/// Returns `None` when the raster carries no content (either dimension zero)
/// or the page is degenerate — the caller must surface that as a capture
/// failure rather than emit a blank page.
pub fn fit(raster: &RasterImage, page: PagePixels) -> Option<FitResult> {
    fit_with_margin(raster, page, 0.0)
}

/// Like [`fit`], but reserves `margin_fraction` of each page edge before
/// fitting. The drawn image stays centred within the full page.
pub fn fit_with_margin(
    raster: &RasterImage,
    page: PagePixels,
    margin_fraction: f64,
) -> Option<FitResult> {
    if raster.is_empty() || page.width <= 0.0 || page.height <= 0.0 {
        return None;
    }

    let margin_x = page.width * margin_fraction;
    let margin_y = page.height * margin_fraction;
    let usable_width = page.width - 2.0 * margin_x;
    let usable_height = page.height - 2.0 * margin_y;
    if usable_width <= 0.0 || usable_height <= 0.0 {
        return None;
    }

    let raster_width = f64::from(raster.width);
    let raster_height = f64::from(raster.height);

    let scale = (usable_width / raster_width).min(usable_height / raster_height);
    let draw_width = raster_width * scale;
    let draw_height = raster_height * scale;

    Some(FitResult {
        scale,
        offset_x: margin_x + (usable_width - draw_width) / 2.0,
        offset_y: margin_y + (usable_height - draw_height) / 2.0,
        draw_width,
        draw_height,
    })
}
