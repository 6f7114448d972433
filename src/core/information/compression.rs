//! Compression-ratio signal (spec 4.4): `|zlib(content)| / |content|` at
//! zlib level 6, used both as a standalone signal and as the `C(x)` term
//! feeding NCD.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub fn compressed_len(bytes: &[u8]) -> usize {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    encoder
        .write_all(bytes)
        .expect("writing to an in-memory encoder cannot fail");
    encoder
        .finish()
        .expect("finishing an in-memory encoder cannot fail")
        .len()
}

/// `ratio = 0` for empty input (nothing to compress, not a meaningful
/// ratio but also not a divide-by-zero).
pub fn ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    compressed_len(bytes) as f64 / bytes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highly_repetitive_text_compresses_well() {
        let repetitive = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".as_bytes();
        assert!(ratio(repetitive) < 0.3);
    }

    #[test]
    fn empty_input_has_zero_ratio() {
        assert_eq!(ratio(&[]), 0.0);
    }
}
