// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// selo-export — the capture & export pipeline for Selo.
//
// Wires the layout reconciler, rasterizer, page fitter, document assembler,
// and delivery channels into the two operations the presentation layer
// calls: generate (download) and share.

pub mod orchestrator;
pub mod reconciler;
pub mod selector;

pub use orchestrator::Exporter;
pub use reconciler::CaptureSurface;
pub use selector::{ExportState, PhaseGuard, select_channel};
