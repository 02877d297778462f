// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout reconciler — reconcile the responsive on-screen layout with the
// fixed physical print layout for the duration of one capture.
//
// The capture surface is an RAII guard: whatever happens between acquire and
// drop (rasterizer error, fit failure, panic unwind), the on-screen tree
// ends up exactly as it was.

use selo_bridge::traits::{LayoutHost, LayoutSnapshot};
use selo_core::error::{Result, SeloError};
use selo_core::types::{CaptureStrategy, CaptureTarget, PageGeometry};
use tracing::{debug, warn};

/// A node forced to an exact physical page geometry, ready to rasterize.
///
/// With `CaptureStrategy::DetachedClone` the node is an off-screen clone and
/// the visible target is never touched; dropping the surface discards the
/// clone. With `CaptureStrategy::InPlace` the node is the live target and
/// dropping the surface writes the pre-capture snapshot back.
pub struct CaptureSurface<'a, H: LayoutHost> {
    host: &'a H,
    node: CaptureTarget,
    restore: Option<LayoutSnapshot>,
    detached: bool,
}

impl<'a, H: LayoutHost> CaptureSurface<'a, H> {
    /// Prepare `target` for capture at the given page geometry.
    ///
    /// Snapshots (or clones) first, then applies the page layout and awaits
    /// one rendering frame so the layout engine settles. Fails with
    /// `TargetNotMounted` before any mutation when the target is gone.
    pub async fn acquire(
        host: &'a H,
        target: &CaptureTarget,
        page: &PageGeometry,
        strategy: CaptureStrategy,
    ) -> Result<CaptureSurface<'a, H>> {
        if !host.is_mounted(target) {
            return Err(SeloError::TargetNotMounted);
        }

        let surface = match strategy {
            CaptureStrategy::DetachedClone => {
                let clone = host.clone_detached(target)?;
                debug!(node = %target, clone = %clone, "capturing detached clone");
                Self {
                    host,
                    node: clone,
                    restore: None,
                    detached: true,
                }
            }
            CaptureStrategy::InPlace => {
                let snapshot = host.snapshot_layout(target)?;
                debug!(node = %target, "capturing in place");
                Self {
                    host,
                    node: *target,
                    restore: Some(snapshot),
                    detached: false,
                }
            }
        };

        // From here the guard is live: an apply failure still releases.
        surface.host.apply_page_layout(&surface.node, page)?;
        surface.host.settle_frame().await;
        Ok(surface)
    }

    /// The node to hand to the rasterizer.
    pub fn node(&self) -> &CaptureTarget {
        &self.node
    }
}

impl<H: LayoutHost> Drop for CaptureSurface<'_, H> {
    fn drop(&mut self) {
        if self.detached {
            self.host.discard_detached(&self.node);
        } else if let Some(snapshot) = self.restore.take()
            && let Err(err) = self.host.restore_layout(&self.node, &snapshot)
        {
            warn!(node = %self.node, error = %err, "failed to restore layout after capture");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selo_bridge::headless::{HeadlessBridge, NodeSpec};

    fn collapsed_preview() -> NodeSpec {
        NodeSpec {
            collapsed: true,
            ..NodeSpec::default()
        }
    }

    #[tokio::test]
    async fn in_place_surface_carries_page_geometry() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec::default());
        let page = PageGeometry::a4_landscape();

        let surface =
            CaptureSurface::acquire(&bridge, &target, &page, CaptureStrategy::InPlace)
                .await
                .expect("acquire");
        assert_eq!(surface.node(), &target);
        assert_eq!(
            bridge.measured_size_mm(&target).expect("measure"),
            (297.0, 210.0)
        );
    }

    #[tokio::test]
    async fn in_place_surface_restores_snapshot_on_drop() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(collapsed_preview());
        let before = bridge.snapshot_layout(&target).expect("snapshot");
        let page = PageGeometry::a4_landscape();

        {
            let surface =
                CaptureSurface::acquire(&bridge, &target, &page, CaptureStrategy::InPlace)
                    .await
                    .expect("acquire");
            // The collapsed marker is cleared while the surface is live.
            assert!(!bridge.snapshot_layout(surface.node()).expect("snapshot").collapsed);
        }

        let after = bridge.snapshot_layout(&target).expect("snapshot");
        assert_eq!(after, before, "layout must be restored on every exit path");
    }

    #[tokio::test]
    async fn detached_clone_never_touches_the_visible_node() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(collapsed_preview());
        let before = bridge.snapshot_layout(&target).expect("snapshot");
        let page = PageGeometry::a4_landscape();

        let surface =
            CaptureSurface::acquire(&bridge, &target, &page, CaptureStrategy::DetachedClone)
                .await
                .expect("acquire");

        assert_ne!(surface.node(), &target);
        // The clone carries the page geometry, the original stays as it was.
        assert_eq!(
            bridge.measured_size_mm(surface.node()).expect("measure"),
            (297.0, 210.0)
        );
        assert_eq!(bridge.snapshot_layout(&target).expect("snapshot"), before);
    }

    #[tokio::test]
    async fn detached_clone_is_discarded_on_drop() {
        let bridge = HeadlessBridge::new();
        let target = bridge.mount(NodeSpec::default());
        let page = PageGeometry::a4_landscape();

        {
            let _surface =
                CaptureSurface::acquire(&bridge, &target, &page, CaptureStrategy::DetachedClone)
                    .await
                    .expect("acquire");
            assert_eq!(bridge.node_count(), 2);
        }
        assert_eq!(bridge.node_count(), 1);
    }

    #[tokio::test]
    async fn unmounted_target_aborts_before_any_mutation() {
        let bridge = HeadlessBridge::new();
        let page = PageGeometry::a4_landscape();

        let result = CaptureSurface::acquire(
            &bridge,
            &CaptureTarget::new(),
            &page,
            CaptureStrategy::DetachedClone,
        )
        .await;
        assert!(matches!(result, Err(SeloError::TargetNotMounted)));
        assert_eq!(bridge.node_count(), 0);
    }
}
