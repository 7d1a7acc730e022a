//! Error types for asset loading, configuration and viewer startup.

use std::path::PathBuf;

use crate::assets::TableKind;

/// Errors raised while reading or decoding a precomputed sky table.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The table file could not be read.
    #[error("failed to read {table} table from {}: {source}", .path.display())]
    Read {
        table: TableKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file holds a different number of bytes than the table dimensions require.
    #[error("{table} table has {actual} bytes, expected {expected}")]
    SizeMismatch {
        table: TableKind,
        expected: usize,
        actual: usize,
    },

    /// A loader thread panicked before producing a result.
    #[error("loader for {0} table panicked")]
    LoaderPanicked(TableKind),
}

/// Errors that can occur when loading or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Preset index outside 1..=9.
    #[error("unknown view preset {0}, expected 1-9")]
    UnknownPreset(u8),
}

/// Fatal startup errors. Any of these aborts the viewer before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
