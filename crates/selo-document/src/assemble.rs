// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — place a captured raster onto a single fixed-size PDF
// page using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use selo_core::error::SeloError;
use selo_core::types::{FitResult, PageGeometry, RasterImage};
use tracing::{debug, info, instrument};

use crate::raster;

/// Point size of one image pixel when the XObject dpi is 72.
const ASSEMBLY_DPI: f32 = 72.0;

/// Builds the single-page document that carries the flattened certificate.
///
/// No text layout, no pagination: the source visual template is the unit of
/// fidelity, so the entire certificate is one raster on one page.
pub struct DocumentAssembler {
    /// Physical geometry of the output page.
    page: PageGeometry,
    /// Ratio that was used to express the page in raster pixel space.
    px_per_mm: f64,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl DocumentAssembler {
    /// Create an assembler for the given page geometry and pixel ratio.
    ///
    /// `px_per_mm` must match the ratio used to compute the `FitResult`,
    /// otherwise the placement would land in the wrong spot on the page.
    pub fn new(page: PageGeometry, px_per_mm: f64) -> Self {
        Self {
            page,
            px_per_mm,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Place `raster` on the page per `placement` and serialise to bytes.
    #[instrument(skip(self, raster, placement), fields(raster_w = raster.width, raster_h = raster.height))]
    pub fn assemble(
        &self,
        raster: &RasterImage,
        placement: &FitResult,
    ) -> Result<Vec<u8>, SeloError> {
        if raster.is_empty() {
            return Err(SeloError::Image("cannot assemble an empty raster".into()));
        }

        let page_w = Mm(self.page.width_mm as f32);
        let page_h = Mm(self.page.height_mm as f32);
        let title = self.title.as_deref().unwrap_or("Certificate");

        info!(
            page_w_mm = self.page.width_mm,
            page_h_mm = self.page.height_mm,
            title,
            "Assembling certificate PDF"
        );

        // printpdf wants tightly-packed RGB8; the rasterizer paints an opaque
        // background, so dropping alpha loses nothing.
        let rgb = raster::to_dynamic(raster)?.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: raster.width as usize,
            height: raster.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(title);
        let xobject_id = doc.add_image(&raw);

        // The placement is in raster pixel space; convert back to physical
        // units through the same ratio the fitter used.
        let draw_w_pt = Mm((placement.draw_width / self.px_per_mm) as f32).into_pt().0;
        let draw_h_pt = Mm((placement.draw_height / self.px_per_mm) as f32).into_pt().0;
        let x_pt = Mm((placement.offset_x / self.px_per_mm) as f32).into_pt().0;

        // PDF origin is bottom-left; the fit offsets measure from the top.
        let y_mm = self.page.height_mm
            - (placement.offset_y + placement.draw_height) / self.px_per_mm;
        let y_pt = Mm(y_mm as f32).into_pt().0;

        // At 72 dpi the image's native point size equals its pixel count, so
        // the scale factors reduce to drawn-size over pixel-size.
        let scale_x = draw_w_pt / raster.width as f32;
        let scale_y = draw_h_pt / raster.height as f32;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_pt)),
                translate_y: Some(Pt(y_pt)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(ASSEMBLY_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        debug!(draw_w_pt, draw_h_pt, x_pt, y_pt, "Raster placed on page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}
