// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selo — platform bridge abstractions.
//
// Defines the capability traits the export pipeline is written against
// (layout host, rasterizer, file sink, share sheet) and the headless
// implementation used on desktop/CI builds. Browser and mobile bridges are
// supplied by host applications.

#![allow(async_fn_in_trait)]

pub mod headless;
pub mod traits;

pub use headless::{HeadlessBridge, NodeSpec};
pub use traits::{
    CaptureOptions, ExportBridge, FileSink, LayoutHost, LayoutSnapshot, PlatformInfo, Rasterizer,
    SavedFile, SharePayload, ShareSheet,
};

/// The bridge used when no platform-specific implementation is wired in.
pub fn headless_bridge() -> HeadlessBridge {
    HeadlessBridge::new()
}
