// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Selo.

use thiserror::Error;

/// Top-level error type for all Selo operations.
#[derive(Debug, Error)]
pub enum SeloError {
    // -- Capture errors --
    #[error("capture target is not mounted")]
    TargetNotMounted,

    #[error("an export is already in flight for this target")]
    ExportInFlight,

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("layout operation failed: {0}")]
    Layout(String),

    // -- Document errors --
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Delivery errors --
    #[error("share sheet rejected the document: {0}")]
    ShareRejected(String),

    #[error("file delivery failed: {0}")]
    DeliveryFailed(String),

    // -- Platform bridge --
    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Ambient --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SeloError>;
