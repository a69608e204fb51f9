//! Exporter for KPC8 tilemaps.
//!
//! The KPC8 console draws a 40x24 grid of tiles, one byte per cell. This crate
//! flattens the single tile layer of an editor map into that 960-byte layout
//! and writes it either verbatim (`.kpcbin`) or as Base64 text (`.base64`).

use std::fmt;

mod common;
mod consts;
mod decoder;
mod encoder;
mod flatten;
mod format;
mod host;
mod map;

pub use consts::{
    BASE64_FORMAT_EXTENSION, BASE64_FORMAT_NAME, BASE64_TILEMAP_LENGTH, BINARY_FORMAT_EXTENSION,
    BINARY_FORMAT_NAME, MAP_HEIGHT, MAP_WIDTH, MAX_TILE_ID, TILEMAP_BYTE_LENGTH,
};
pub use decoder::{from_base64, read_base64_tilemap, read_binary_tilemap};
pub use encoder::{encode, to_base64, to_binary};
pub use flatten::flatten;
pub use format::{
    builtin_formats, register_formats, ExportFormat, ExportReport, FormatRegistry, FormatTable,
    PayloadKind,
};
pub use host::{BinaryFile, FileHost, FsFile, FsHost, OpenMode, TextFile};
pub use map::{Cell, LayerKind, MapLayer, MemoryLayer, MemoryMap, TileMap};

/// Row-major tile bytes for one KPC8 screen. Byte `y * 40 + x` holds cell `(x, y)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FlatByteBuffer {
    bytes: [u8; TILEMAP_BYTE_LENGTH],
}

impl FlatByteBuffer {
    pub fn zeroed() -> Self {
        Self {
            bytes: [0_u8; TILEMAP_BYTE_LENGTH],
        }
    }

    /// Wraps an existing payload, rejecting anything that is not exactly 960 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; TILEMAP_BYTE_LENGTH] = bytes.try_into().map_err(|_| {
            ExportError::new(
                ExportErrorCode::InvalidBufferLength,
                format!(
                    "Tilemap payload length mismatch. expected={TILEMAP_BYTE_LENGTH} got={}",
                    bytes.len()
                ),
            )
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= MAP_WIDTH || y >= MAP_HEIGHT {
            return None;
        }
        self.bytes.get((y * MAP_WIDTH + x) as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn set(&mut self, index: usize, tile: u8) {
        self.bytes[index] = tile;
    }
}

impl Default for FlatByteBuffer {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl AsRef<[u8]> for FlatByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FlatByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.bytes.iter().filter(|byte| **byte != 0).count();
        f.debug_struct("FlatByteBuffer")
            .field("len", &self.bytes.len())
            .field("non_zero", &used)
            .finish()
    }
}

/// A rendered export payload, ready to be handed to a destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedOutput {
    Binary(Vec<u8>),
    Base64(String),
}

impl EncodedOutput {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Base64(text) => text.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorCode {
    MultipleLayers,
    DimensionMismatch,
    TileIdRange,
    InvalidBase64,
    InvalidBufferLength,
    UnknownFormat,
    WriteFailed,
}

impl ExportErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultipleLayers => "MULTIPLE_LAYERS",
            Self::DimensionMismatch => "DIMENSION_MISMATCH",
            Self::TileIdRange => "TILE_ID_RANGE",
            Self::InvalidBase64 => "INVALID_BASE64",
            Self::InvalidBufferLength => "INVALID_BUFFER_LENGTH",
            Self::UnknownFormat => "UNKNOWN_FORMAT",
            Self::WriteFailed => "WRITE_FAILED",
        }
    }

    /// Validation failures raised while flattening a map.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::MultipleLayers | Self::DimensionMismatch | Self::TileIdRange
        )
    }
}

impl fmt::Display for ExportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportError {
    pub code: ExportErrorCode,
    pub message: String,
}

impl ExportError {
    pub fn new(code: ExportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ExportError {}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_buffer_has_platform_length() {
        let buffer = FlatByteBuffer::zeroed();
        assert_eq!(buffer.len(), 960);
        assert!(buffer.as_bytes().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let error = FlatByteBuffer::from_bytes(&[0_u8; 959]).expect_err("should reject");
        assert_eq!(error.code, ExportErrorCode::InvalidBufferLength);

        let error = FlatByteBuffer::from_bytes(&[0_u8; 961]).expect_err("should reject");
        assert_eq!(error.code, ExportErrorCode::InvalidBufferLength);
    }

    #[test]
    fn tile_at_uses_row_major_index() {
        let mut raw = [0_u8; TILEMAP_BYTE_LENGTH];
        raw[2 * 40 + 7] = 99;
        let buffer = FlatByteBuffer::from_bytes(&raw).expect("wrap payload");

        assert_eq!(buffer.tile_at(7, 2), Some(99));
        assert_eq!(buffer.tile_at(2, 7), Some(0));
        assert_eq!(buffer.tile_at(40, 0), None);
        assert_eq!(buffer.tile_at(0, 24), None);
    }

    #[test]
    fn error_display_includes_code() {
        let error = ExportError::new(
            ExportErrorCode::TileIdRange,
            "KPC8 supports up to 256 tiles IDs",
        );
        assert_eq!(
            error.to_string(),
            "TILE_ID_RANGE: KPC8 supports up to 256 tiles IDs"
        );
        assert!(error.code.is_validation());
        assert!(!ExportErrorCode::WriteFailed.is_validation());
    }
}
