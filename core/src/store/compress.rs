// Snapshot compression behind an injected capability

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CompressionError {
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
}

/// Compression applied to persisted snapshots before they reach the
/// storage medium. Compression itself cannot fail; decompression can.
pub trait Compression: Send + Sync {
    fn compress(&self, data: &[u8]) -> Vec<u8>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError>;
}

/// LZ4 with the uncompressed size prepended, so decompression needs no
/// out-of-band length.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compression;

impl Compression for Lz4Compression {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        lz4_flex::compress_prepend_size(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        lz4_flex::decompress_size_prepended(data)
            .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))
    }
}
