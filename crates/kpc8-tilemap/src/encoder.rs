use crate::consts::{BASE64_ALPHABET, BASE64_PAD};
use crate::{EncodedOutput, FlatByteBuffer, PayloadKind};

/// Binary payloads are written verbatim.
pub fn to_binary(bytes: &[u8]) -> Vec<u8> {
    bytes.to_vec()
}

/// Standard padded Base64 (RFC 4648 section 4) of arbitrary bytes.
pub fn to_base64(bytes: &[u8]) -> String {
    let mut out = Vec::with_capacity(bytes.len().div_ceil(3) * 4);

    let mut groups = bytes.chunks_exact(3);
    for group in &mut groups {
        let (b0, b1, b2) = (group[0], group[1], group[2]);
        out.push(symbol(b0 >> 2));
        out.push(symbol(((b0 & 0x03) << 4) | (b1 >> 4)));
        out.push(symbol(((b1 & 0x0f) << 2) | (b2 >> 6)));
        out.push(symbol(b2 & 0x3f));
    }

    match *groups.remainder() {
        [b0] => {
            out.push(symbol(b0 >> 2));
            out.push(symbol((b0 & 0x03) << 4));
            out.push(BASE64_PAD);
            out.push(BASE64_PAD);
        }
        [b0, b1] => {
            out.push(symbol(b0 >> 2));
            out.push(symbol(((b0 & 0x03) << 4) | (b1 >> 4)));
            out.push(symbol((b1 & 0x0f) << 2));
            out.push(BASE64_PAD);
        }
        _ => {}
    }

    // Every pushed byte comes from the ASCII alphabet or is '='.
    out.into_iter().map(char::from).collect()
}

pub fn encode(kind: PayloadKind, buffer: &FlatByteBuffer) -> EncodedOutput {
    match kind {
        PayloadKind::Binary => EncodedOutput::Binary(to_binary(buffer.as_bytes())),
        PayloadKind::Base64 => EncodedOutput::Base64(to_base64(buffer.as_bytes())),
    }
}

fn symbol(sextet: u8) -> u8 {
    BASE64_ALPHABET[usize::from(sextet & 0x3f)]
}
