// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless bridge for desktop/CI builds where no real visual tree exists.
//
// Maintains an in-memory scene of nodes with layout styles and a
// collapsed-for-mobile marker, rasterizes them as flat colour blocks, saves
// files to an optional output directory, and records share attempts instead
// of presenting a sheet. Real browser and mobile bridges live with the host
// application.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use selo_core::config::CSS_PX_PER_MM;
use selo_core::error::{Result, SeloError};
use selo_core::types::{CaptureTarget, PageGeometry, PlatformFamily, RasterImage};

use crate::traits::{
    CaptureOptions, ExportBridge, FileSink, LayoutHost, LayoutSnapshot, PlatformInfo, Rasterizer,
    SavedFile, SharePayload, ShareSheet,
};

/// Description of a node to mount into the headless scene.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub width_mm: Option<f64>,
    pub max_width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub max_height_mm: Option<f64>,
    /// Mount with the collapsed-for-mobile marker set.
    pub collapsed: bool,
    /// Flat colour drawn as the node's content.
    pub content: [u8; 3],
}

impl Default for NodeSpec {
    /// A responsive certificate preview at its on-screen geometry.
    fn default() -> Self {
        let screen = PageGeometry::screen_preview();
        Self {
            width_mm: Some(screen.width_mm),
            max_width_mm: Some(screen.width_mm),
            height_mm: Some(screen.height_mm),
            max_height_mm: None,
            collapsed: false,
            content: [230, 224, 200],
        }
    }
}

/// One node in the headless scene.
#[derive(Debug, Clone)]
struct SceneNode {
    width_mm: Option<f64>,
    max_width_mm: Option<f64>,
    height_mm: Option<f64>,
    max_height_mm: Option<f64>,
    collapsed: bool,
    content: [u8; 3],
    detached: bool,
}

impl SceneNode {
    fn from_spec(spec: &NodeSpec) -> Self {
        Self {
            width_mm: spec.width_mm,
            max_width_mm: spec.max_width_mm,
            height_mm: spec.height_mm,
            max_height_mm: spec.max_height_mm,
            collapsed: spec.collapsed,
            content: spec.content,
            detached: false,
        }
    }

    /// Measured box, in millimetres. A collapsed node measures zero.
    fn measured_mm(&self) -> (f64, f64) {
        if self.collapsed {
            return (0.0, 0.0);
        }
        let mut width = self.width_mm.or(self.max_width_mm).unwrap_or(0.0);
        if let Some(max) = self.max_width_mm {
            width = width.min(max);
        }
        let mut height = self.height_mm.or(self.max_height_mm).unwrap_or(0.0);
        if let Some(max) = self.max_height_mm {
            height = height.min(max);
        }
        (width, height)
    }
}

/// A file the bridge was asked to save.
#[derive(Debug, Clone)]
pub struct SaveRecord {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A payload the bridge was asked to share.
#[derive(Debug, Clone)]
pub struct ShareRecord {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<CaptureTarget, SceneNode>,
    output_dir: Option<PathBuf>,
    platform: Option<PlatformFamily>,
    share_available: bool,
    file_sharing: bool,
    frame_delay: Option<Duration>,
    rasterize_empty: bool,
    rasterize_error: Option<String>,
    save_error: Option<String>,
    share_error: Option<String>,
    saved: Vec<SaveRecord>,
    shared: Vec<ShareRecord>,
}

/// In-memory bridge used on non-native builds and throughout the test suite.
#[derive(Debug, Default)]
pub struct HeadlessBridge {
    inner: Mutex<Inner>,
}

impl HeadlessBridge {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Scene management -----------------------------------------------------

    /// Mount a node into the scene and return its handle.
    pub fn mount(&self, spec: NodeSpec) -> CaptureTarget {
        let target = CaptureTarget::new();
        let mut inner = self.lock();
        inner.nodes.insert(target, SceneNode::from_spec(&spec));
        target
    }

    /// Remove a node from the scene.
    pub fn unmount(&self, target: &CaptureTarget) {
        self.lock().nodes.remove(target);
    }

    /// Number of nodes currently in the scene, detached clones included.
    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    // -- Configuration --------------------------------------------------------

    /// Directory where saved files are written. Without one, saves are only
    /// recorded.
    pub fn set_output_dir(&self, dir: impl Into<PathBuf>) {
        self.lock().output_dir = Some(dir.into());
    }

    /// Report a specific platform family instead of `Desktop`.
    pub fn set_platform(&self, family: PlatformFamily) {
        self.lock().platform = Some(family);
    }

    /// Configure the share capability probe answers.
    pub fn set_share_support(&self, available: bool, file_sharing: bool) {
        let mut inner = self.lock();
        inner.share_available = available;
        inner.file_sharing = file_sharing;
    }

    /// Make `settle_frame` sleep instead of merely yielding.
    pub fn set_frame_delay(&self, delay: Duration) {
        self.lock().frame_delay = Some(delay);
    }

    /// Make every subsequent rasterization fail with `message`.
    pub fn fail_rasterize(&self, message: impl Into<String>) {
        self.lock().rasterize_error = Some(message.into());
    }

    /// Make every subsequent rasterization return an empty image, the way a
    /// browser canvas capture silently can.
    pub fn return_empty_raster(&self) {
        self.lock().rasterize_empty = true;
    }

    /// Make every subsequent save fail with `message`.
    pub fn fail_save(&self, message: impl Into<String>) {
        self.lock().save_error = Some(message.into());
    }

    /// Make every subsequent share fail with `message` (a cancelled sheet).
    pub fn fail_share(&self, message: impl Into<String>) {
        self.lock().share_error = Some(message.into());
    }

    // -- Delivery records -----------------------------------------------------

    pub fn saved_files(&self) -> Vec<SaveRecord> {
        self.lock().saved.clone()
    }

    pub fn shared_payloads(&self) -> Vec<ShareRecord> {
        self.lock().shared.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("scene lock poisoned")
    }

    fn with_node<T>(
        &self,
        target: &CaptureTarget,
        f: impl FnOnce(&mut SceneNode) -> T,
    ) -> Result<T> {
        let mut inner = self.lock();
        let node = inner
            .nodes
            .get_mut(target)
            .ok_or_else(|| SeloError::Layout(format!("unknown node {target}")))?;
        Ok(f(node))
    }
}

impl LayoutHost for HeadlessBridge {
    fn is_mounted(&self, target: &CaptureTarget) -> bool {
        self.lock().nodes.contains_key(target)
    }

    fn snapshot_layout(&self, target: &CaptureTarget) -> Result<LayoutSnapshot> {
        self.with_node(target, |node| LayoutSnapshot {
            width_mm: node.width_mm,
            max_width_mm: node.max_width_mm,
            height_mm: node.height_mm,
            max_height_mm: node.max_height_mm,
            collapsed: node.collapsed,
        })
    }

    fn apply_page_layout(&self, target: &CaptureTarget, page: &PageGeometry) -> Result<()> {
        self.with_node(target, |node| {
            node.width_mm = Some(page.width_mm);
            node.max_width_mm = None;
            node.height_mm = Some(page.height_mm);
            node.max_height_mm = None;
            node.collapsed = false;
        })
    }

    fn restore_layout(&self, target: &CaptureTarget, snapshot: &LayoutSnapshot) -> Result<()> {
        self.with_node(target, |node| {
            node.width_mm = snapshot.width_mm;
            node.max_width_mm = snapshot.max_width_mm;
            node.height_mm = snapshot.height_mm;
            node.max_height_mm = snapshot.max_height_mm;
            node.collapsed = snapshot.collapsed;
        })
    }

    fn clone_detached(&self, target: &CaptureTarget) -> Result<CaptureTarget> {
        let mut inner = self.lock();
        let mut clone = inner
            .nodes
            .get(target)
            .cloned()
            .ok_or_else(|| SeloError::Layout(format!("unknown node {target}")))?;
        clone.detached = true;
        let handle = CaptureTarget::new();
        inner.nodes.insert(handle, clone);
        Ok(handle)
    }

    fn discard_detached(&self, target: &CaptureTarget) {
        let mut inner = self.lock();
        if inner.nodes.get(target).is_some_and(|node| node.detached) {
            inner.nodes.remove(target);
        }
    }

    fn measured_size_mm(&self, target: &CaptureTarget) -> Result<(f64, f64)> {
        self.with_node(target, |node| node.measured_mm())
    }

    async fn settle_frame(&self) {
        let delay = self.lock().frame_delay;
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
    }
}

impl Rasterizer for HeadlessBridge {
    async fn rasterize(
        &self,
        target: &CaptureTarget,
        options: &CaptureOptions,
    ) -> Result<RasterImage> {
        {
            let inner = self.lock();
            if let Some(message) = inner.rasterize_error.clone() {
                return Err(SeloError::CaptureFailed(message));
            }
            if inner.rasterize_empty {
                return Ok(RasterImage {
                    width: 0,
                    height: 0,
                    pixels: Vec::new(),
                });
            }
        }

        let (content, (width_mm, height_mm)) = self
            .with_node(target, |node| (node.content, node.measured_mm()))
            .map_err(|_| SeloError::CaptureFailed(format!("unknown node {target}")))?;

        let px_per_mm = CSS_PX_PER_MM * f64::from(options.pixel_scale);
        let width = (width_mm * px_per_mm).round() as u32;
        let height = (height_mm * px_per_mm).round() as u32;
        if width == 0 || height == 0 {
            return Ok(RasterImage {
                width: 0,
                height: 0,
                pixels: Vec::new(),
            });
        }

        // Background everywhere, content colour in the inner 80% box.
        let [br, bg, bb] = options.background;
        let inset_x = width / 10;
        let inset_y = height / 10;
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let in_content = x >= inset_x
                    && x < width - inset_x
                    && y >= inset_y
                    && y < height - inset_y;
                if in_content {
                    pixels.extend_from_slice(&[content[0], content[1], content[2], 255]);
                } else {
                    pixels.extend_from_slice(&[br, bg, bb, 255]);
                }
            }
        }

        Ok(RasterImage {
            width,
            height,
            pixels,
        })
    }
}

impl FileSink for HeadlessBridge {
    async fn save_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<SavedFile> {
        let (error, output_dir) = {
            let inner = self.lock();
            (inner.save_error.clone(), inner.output_dir.clone())
        };
        if let Some(message) = error {
            return Err(SeloError::DeliveryFailed(message));
        }

        let location = match output_dir {
            Some(dir) => {
                let path = dir.join(file_name);
                std::fs::write(&path, bytes).map_err(|err| {
                    SeloError::DeliveryFailed(format!(
                        "failed to write {}: {err}",
                        path.display()
                    ))
                })?;
                Some(path.display().to_string())
            }
            None => None,
        };

        self.lock().saved.push(SaveRecord {
            file_name: file_name.to_owned(),
            mime_type: mime_type.to_owned(),
            bytes: bytes.to_vec(),
        });

        Ok(SavedFile {
            file_name: file_name.to_owned(),
            location,
        })
    }
}

impl ShareSheet for HeadlessBridge {
    fn share_available(&self) -> bool {
        self.lock().share_available
    }

    fn can_share_files(&self, _mime_type: &str) -> bool {
        let inner = self.lock();
        inner.share_available && inner.file_sharing
    }

    async fn share(&self, payload: SharePayload<'_>) -> Result<()> {
        if !self.share_available() {
            tracing::warn!("share requested on headless bridge without share support");
            return Err(SeloError::PlatformUnavailable);
        }
        if let Some(message) = self.lock().share_error.clone() {
            return Err(SeloError::ShareRejected(message));
        }

        self.lock().shared.push(ShareRecord {
            title: payload.title.to_owned(),
            text: payload.text.to_owned(),
            file_name: payload.file_name.to_owned(),
            mime_type: payload.mime_type.to_owned(),
            bytes: payload.bytes.to_vec(),
        });
        Ok(())
    }
}

impl ExportBridge for HeadlessBridge {
    fn platform(&self) -> PlatformInfo {
        let family = self.lock().platform.unwrap_or(PlatformFamily::Desktop);
        PlatformInfo {
            family,
            name: "Headless".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_and_snapshot_round_trip() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec::default());

        let snapshot = bridge.snapshot_layout(&target).expect("snapshot");
        assert_eq!(snapshot.width_mm, Some(279.168));
        assert!(!snapshot.collapsed);

        bridge.restore_layout(&target, &snapshot).expect("restore");
        assert_eq!(bridge.snapshot_layout(&target).expect("snapshot"), snapshot);
    }

    #[test]
    fn apply_page_layout_clears_collapsed_marker() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec {
            collapsed: true,
            ..NodeSpec::default()
        });
        assert_eq!(bridge.measured_size_mm(&target).expect("measure"), (0.0, 0.0));

        let page = PageGeometry::a4_landscape();
        bridge.apply_page_layout(&target, &page).expect("apply");

        let (w, h) = bridge.measured_size_mm(&target).expect("measure");
        assert_eq!((w, h), (297.0, 210.0));
        assert!(!bridge.snapshot_layout(&target).expect("snapshot").collapsed);
    }

    #[test]
    fn clone_detached_then_discard_restores_scene() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec::default());
        assert_eq!(bridge.node_count(), 1);

        let clone = bridge.clone_detached(&target).expect("clone");
        assert_eq!(bridge.node_count(), 2);
        assert!(bridge.is_mounted(&clone));

        bridge.discard_detached(&clone);
        assert_eq!(bridge.node_count(), 1);
    }

    #[test]
    fn discard_ignores_live_nodes_and_unknown_handles() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec::default());

        bridge.discard_detached(&target);
        assert_eq!(bridge.node_count(), 1, "live nodes must survive discard");

        bridge.discard_detached(&CaptureTarget::new());
        assert_eq!(bridge.node_count(), 1);
    }

    #[tokio::test]
    async fn rasterize_scales_by_pixel_ratio() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec {
            width_mm: Some(100.0),
            max_width_mm: None,
            height_mm: Some(50.0),
            max_height_mm: None,
            collapsed: false,
            content: [10, 20, 30],
        });

        let options = CaptureOptions::default();
        let raster = bridge.rasterize(&target, &options).await.expect("raster");

        let expected_w = (100.0 * CSS_PX_PER_MM * 2.0_f64).round() as u32;
        let expected_h = (50.0 * CSS_PX_PER_MM * 2.0_f64).round() as u32;
        assert_eq!((raster.width, raster.height), (expected_w, expected_h));
        assert_eq!(
            raster.pixels.len(),
            raster.width as usize * raster.height as usize * 4
        );
        // Corner pixel is background, centre pixel is content.
        assert_eq!(&raster.pixels[0..3], &[255, 255, 255]);
        let centre =
            ((raster.height / 2) * raster.width + raster.width / 2) as usize * 4;
        assert_eq!(&raster.pixels[centre..centre + 3], &[10, 20, 30]);
    }

    #[tokio::test]
    async fn collapsed_node_rasterizes_empty() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec {
            collapsed: true,
            ..NodeSpec::default()
        });

        let raster = bridge
            .rasterize(&target, &CaptureOptions::default())
            .await
            .expect("raster");
        assert!(raster.is_empty());
    }

    #[tokio::test]
    async fn save_writes_into_output_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = HeadlessBridge::new();
        bridge.set_output_dir(dir.path());

        let saved = bridge
            .save_file("certificate.pdf", "application/pdf", b"%PDF-stub")
            .await
            .expect("save");

        let location = saved.location.expect("location");
        assert_eq!(std::fs::read(&location).expect("read back"), b"%PDF-stub");
        assert_eq!(bridge.saved_files().len(), 1);
    }

    #[tokio::test]
    async fn share_without_support_is_unavailable() {
        let bridge = HeadlessBridge::new();
        let payload = SharePayload {
            title: "Certificate",
            text: "Generated certificate",
            file_name: "certificate.pdf",
            mime_type: "application/pdf",
            bytes: b"%PDF-stub",
        };
        let err = bridge.share(payload).await.expect_err("share must fail");
        assert!(matches!(err, SeloError::PlatformUnavailable));
    }

    #[tokio::test]
    async fn share_records_payload_when_supported() {
        let bridge = HeadlessBridge::new();
        bridge.set_share_support(true, true);

        let payload = SharePayload {
            title: "Certificate",
            text: "Generated certificate",
            file_name: "certificate.pdf",
            mime_type: "application/pdf",
            bytes: b"%PDF-stub",
        };
        bridge.share(payload).await.expect("share");

        let shared = bridge.shared_payloads();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].file_name, "certificate.pdf");
        assert_eq!(shared[0].bytes, b"%PDF-stub");
    }

    #[tokio::test]
    async fn injected_failures_surface_as_pipeline_errors() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec::default());

        bridge.fail_rasterize("canvas lost");
        let err = bridge
            .rasterize(&target, &CaptureOptions::default())
            .await
            .expect_err("rasterize must fail");
        assert!(matches!(err, SeloError::CaptureFailed(_)));

        bridge.fail_save("disk full");
        let err = bridge
            .save_file("certificate.pdf", "application/pdf", b"x")
            .await
            .expect_err("save must fail");
        assert!(matches!(err, SeloError::DeliveryFailed(_)));
    }
}
