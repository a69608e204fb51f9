pub const MAP_WIDTH: u32 = 40;
pub const MAP_HEIGHT: u32 = 24;
pub const TILEMAP_BYTE_LENGTH: usize = (MAP_WIDTH * MAP_HEIGHT) as usize;
pub const MAX_TILE_ID: u32 = u8::MAX as u32;
pub const BASE64_TILEMAP_LENGTH: usize = TILEMAP_BYTE_LENGTH.div_ceil(3) * 4;

pub const BASE64_FORMAT_NAME: &str = "KPC8 Tilemap base64";
pub const BASE64_FORMAT_EXTENSION: &str = "base64";
pub const BINARY_FORMAT_NAME: &str = "KPC8 Tilemap binary";
pub const BINARY_FORMAT_EXTENSION: &str = "kpcbin";

pub(crate) const BASE64_ALPHABET: [u8; 64] =
    *b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
pub(crate) const BASE64_PAD: u8 = b'=';
pub(crate) const BASE64_INVALID: u8 = 0xff;

pub(crate) const MULTIPLE_LAYERS_MESSAGE: &str = "KPC8 supports only one layer";
pub(crate) const DIMENSION_MISMATCH_MESSAGE: &str = "KPC8 supports only 40x24 tilemaps";
pub(crate) const TILE_ID_RANGE_MESSAGE: &str = "KPC8 supports up to 256 tiles IDs";
