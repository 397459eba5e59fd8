use crate::{ParquetError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Page compression codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    Uncompressed,
    #[default]
    Snappy,
    Gzip,
}

const CODEC_UNCOMPRESSED: i32 = 0;
const CODEC_SNAPPY: i32 = 1;
const CODEC_GZIP: i32 = 2;

impl Compression {
    /// Codec id stored in column chunk metadata
    pub fn codec(&self) -> i32 {
        match self {
            Compression::Uncompressed => CODEC_UNCOMPRESSED,
            Compression::Snappy => CODEC_SNAPPY,
            Compression::Gzip => CODEC_GZIP,
        }
    }

    pub fn from_codec(codec: i32) -> Result<Self> {
        match codec {
            CODEC_UNCOMPRESSED => Ok(Compression::Uncompressed),
            CODEC_SNAPPY => Ok(Compression::Snappy),
            CODEC_GZIP => Ok(Compression::Gzip),
            other => Err(ParquetError::unsupported(format!(
                "compression codec {other}"
            ))),
        }
    }

    /// Compress a page body; Snappy uses the raw block format
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::Uncompressed => Ok(data.to_vec()),
            Compression::Snappy => Ok(snap::raw::Encoder::new().compress_vec(data)?),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }

    /// Decompress a page body that the page header says is
    /// `uncompressed_size` bytes long.
    ///
    /// No more than `uncompressed_size + 1` bytes are ever produced, so a
    /// lying header costs at most the size it claims.
    pub fn decompress(&self, data: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let out = match self {
            Compression::Uncompressed => data.to_vec(),
            Compression::Snappy => {
                let len = snap::raw::decompress_len(data).map_err(corrupt_snappy)?;
                if len != uncompressed_size {
                    return Err(size_mismatch(len, uncompressed_size));
                }
                snap::raw::Decoder::new()
                    .decompress_vec(data)
                    .map_err(corrupt_snappy)?
            }
            Compression::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(data)
                    .take(uncompressed_size as u64 + 1)
                    .read_to_end(&mut out)
                    .map_err(|e| ParquetError::corrupt(format!("gzip page: {e}")))?;
                out
            }
        };
        if out.len() != uncompressed_size {
            return Err(size_mismatch(out.len(), uncompressed_size));
        }
        Ok(out)
    }
}

fn corrupt_snappy(e: snap::Error) -> ParquetError {
    ParquetError::corrupt(format!("snappy page: {e}"))
}

fn size_mismatch(actual: usize, expected: usize) -> ParquetError {
    ParquetError::corrupt(format!(
        "page decompressed to {actual} bytes, header says {expected}"
    ))
}
