//! Loading of the three precomputed atmosphere tables.
//!
//! Each table is a flat file of little-endian `f32` RGBA samples whose length is
//! fixed by the table dimensions. Nothing here is recoverable: a missing file or
//! a wrong byte count aborts startup.

use std::fmt;
use std::path::Path;
use std::thread;

use crate::config::AssetConfig;
use crate::error::AssetError;

/// Channels per texel in every table.
pub const CHANNELS: usize = 4;

/// Texel dimensions of a table. `depth == 1` means a 2D table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDims {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl TableDims {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Number of `f32` samples the table holds.
    pub fn element_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize * CHANNELS
    }

    pub fn byte_len(&self) -> usize {
        self.element_count() * std::mem::size_of::<f32>()
    }

    pub fn is_volume(&self) -> bool {
        self.depth > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Transmittance,
    Scattering,
    Irradiance,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        TableKind::Transmittance,
        TableKind::Scattering,
        TableKind::Irradiance,
    ];

    pub fn dims(self) -> TableDims {
        match self {
            TableKind::Transmittance => TableDims::new(256, 64, 1),
            // 8 nu slices of 32 mu_s texels side by side, 128 mu rows, 32 r layers
            TableKind::Scattering => TableDims::new(256, 128, 32),
            TableKind::Irradiance => TableDims::new(64, 16, 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TableKind::Transmittance => "transmittance",
            TableKind::Scattering => "scattering",
            TableKind::Irradiance => "irradiance",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded table. The samples are never modified after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyTable {
    kind: TableKind,
    samples: Vec<f32>,
}

impl SkyTable {
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn dims(&self) -> TableDims {
        self.kind.dims()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// The full set of tables needed to build the sky material.
#[derive(Debug, Clone)]
pub struct SkyTables {
    pub transmittance: SkyTable,
    pub scattering: SkyTable,
    pub irradiance: SkyTable,
}

/// Decodes raw file contents into a table, rejecting any byte count other than
/// the exact size implied by the table dimensions.
pub fn decode_table(kind: TableKind, bytes: &[u8]) -> Result<SkyTable, AssetError> {
    let expected = kind.dims().byte_len();
    if bytes.len() != expected {
        return Err(AssetError::SizeMismatch {
            table: kind,
            expected,
            actual: bytes.len(),
        });
    }

    let samples = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(SkyTable { kind, samples })
}

pub fn read_table(kind: TableKind, path: &Path) -> Result<SkyTable, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        table: kind,
        path: path.to_path_buf(),
        source,
    })?;
    let table = decode_table(kind, &bytes)?;
    log::info!(
        "loaded {} table ({} samples) from {}",
        kind,
        table.samples.len(),
        path.display()
    );
    Ok(table)
}

/// Runs `read` for all three tables concurrently and waits for every one of
/// them. Either all three tables come back or the first failure (in table
/// order) is returned.
pub fn load_tables_with<F>(read: F) -> Result<SkyTables, AssetError>
where
    F: Fn(TableKind) -> Result<SkyTable, AssetError> + Sync,
{
    let read = &read;
    let results: Vec<Result<SkyTable, AssetError>> = thread::scope(|scope| {
        let handles: Vec<_> = TableKind::ALL
            .iter()
            .map(|&kind| (kind, scope.spawn(move || read(kind))))
            .collect();

        handles
            .into_iter()
            .map(|(kind, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(AssetError::LoaderPanicked(kind)))
            })
            .collect()
    });

    let mut results = results.into_iter();
    let mut next = |kind: TableKind| -> Result<SkyTable, AssetError> {
        let table = results.next().unwrap_or(Err(AssetError::LoaderPanicked(kind)))?;
        debug_assert_eq!(table.kind, kind);
        Ok(table)
    };

    Ok(SkyTables {
        transmittance: next(TableKind::Transmittance)?,
        scattering: next(TableKind::Scattering)?,
        irradiance: next(TableKind::Irradiance)?,
    })
}

/// Reads the three tables from the configured asset directory.
pub fn load_tables(config: &AssetConfig) -> Result<SkyTables, AssetError> {
    log::info!("loading sky tables from {}", config.dir.display());
    load_tables_with(|kind| read_table(kind, &config.path_for(kind)))
}
