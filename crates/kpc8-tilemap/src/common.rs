use std::io;
use std::path::Path;

use crate::consts::{BASE64_ALPHABET, BASE64_INVALID};
use crate::{ExportError, ExportErrorCode};

pub(crate) const BASE64_DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
    let mut table = [BASE64_INVALID; 256];
    let mut idx = 0;
    while idx < BASE64_ALPHABET.len() {
        table[BASE64_ALPHABET[idx] as usize] = idx as u8;
        idx += 1;
    }
    table
}

pub(crate) fn base64_sextet(symbol: u8) -> Option<u8> {
    match BASE64_DECODE_TABLE[usize::from(symbol)] {
        BASE64_INVALID => None,
        value => Some(value),
    }
}

/// Lowercases an extension and strips one leading dot, so `".KPCBIN"` matches `"kpcbin"`.
pub(crate) fn normalize_extension(extension: &str) -> String {
    extension
        .strip_prefix('.')
        .unwrap_or(extension)
        .to_ascii_lowercase()
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension)
}

pub(crate) fn write_failed(action: &str, path: &Path, err: io::Error) -> ExportError {
    ExportError::new(
        ExportErrorCode::WriteFailed,
        format!("Could not {action} {}: {err}", path.display()),
    )
}
