use crate::common::base64_sextet;
use crate::consts::BASE64_PAD;
use crate::{ExportError, ExportErrorCode, FlatByteBuffer, Result};

/// Strict decoder for the padded standard alphabet produced by [`crate::to_base64`].
pub fn from_base64(text: &str) -> Result<Vec<u8>> {
    let symbols = text.as_bytes();
    if symbols.len() % 4 != 0 {
        return Err(invalid_base64(format!(
            "Base64 length {} is not a multiple of 4.",
            symbols.len()
        )));
    }

    let mut out = Vec::with_capacity(symbols.len() / 4 * 3);
    let quad_count = symbols.len() / 4;

    for (quad_idx, quad) in symbols.chunks_exact(4).enumerate() {
        let offset = quad_idx * 4;
        let is_last = quad_idx + 1 == quad_count;
        let padding = quad.iter().rev().take_while(|symbol| **symbol == BASE64_PAD).count();

        if padding > 0 && !is_last {
            return Err(invalid_base64(format!(
                "Padding before end of input at offset {}.",
                offset + 4 - padding
            )));
        }
        if padding > 2 {
            return Err(invalid_base64(format!(
                "Too much padding at offset {}.",
                offset + 4 - padding
            )));
        }

        let mut sextets = [0_u8; 4];
        for (idx, symbol) in quad[..4 - padding].iter().enumerate() {
            sextets[idx] = base64_sextet(*symbol).ok_or_else(|| {
                invalid_base64(format!(
                    "Invalid symbol {:?} at offset {}.",
                    char::from(*symbol),
                    offset + idx
                ))
            })?;
        }

        let [s0, s1, s2, s3] = sextets;
        match padding {
            0 => {
                out.push((s0 << 2) | (s1 >> 4));
                out.push((s1 << 4) | (s2 >> 2));
                out.push((s2 << 6) | s3);
            }
            1 => {
                if s2 & 0x03 != 0 {
                    return Err(non_canonical(offset + 2));
                }
                out.push((s0 << 2) | (s1 >> 4));
                out.push((s1 << 4) | (s2 >> 2));
            }
            _ => {
                if s1 & 0x0f != 0 {
                    return Err(non_canonical(offset + 1));
                }
                out.push((s0 << 2) | (s1 >> 4));
            }
        }
    }

    Ok(out)
}

/// Reads back a `.base64` export.
pub fn read_base64_tilemap(text: &str) -> Result<FlatByteBuffer> {
    let bytes = from_base64(text.trim_end())?;
    FlatByteBuffer::from_bytes(&bytes)
}

/// Reads back a `.kpcbin` export.
pub fn read_binary_tilemap(bytes: &[u8]) -> Result<FlatByteBuffer> {
    FlatByteBuffer::from_bytes(bytes)
}

fn invalid_base64(message: String) -> ExportError {
    ExportError::new(ExportErrorCode::InvalidBase64, message)
}

fn non_canonical(offset: usize) -> ExportError {
    invalid_base64(format!("Non-zero trailing bits at offset {offset}."))
}
