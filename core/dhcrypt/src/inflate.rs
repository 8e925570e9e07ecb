use crate::error::{DecryptError, Result, leading};
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write;

fn inflate_error(reason: impl Into<String>, payload: &[u8]) -> DecryptError {
    DecryptError::Inflate {
        reason: reason.into(),
        found: leading(payload),
    }
}

/// Inflate a zlib stream.
///
/// Unlike `ZlibDecoder::read_to_end`, a stream that runs out of input before its end
/// marker is an error instead of a short read.
pub fn inflate(payload: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(payload.len().saturating_mul(4).max(256));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }
        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();

        let status = inflater
            .decompress_vec(&payload[consumed..], &mut out, FlushDecompress::Finish)
            .map_err(|e| inflate_error(e.to_string(), payload))?;

        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => {
                let stalled =
                    inflater.total_in() as usize == consumed && inflater.total_out() == produced;
                if stalled && out.len() < out.capacity() {
                    return Err(inflate_error(
                        "compressed stream ended before its end marker",
                        payload,
                    ));
                }
            }
        }
    }
}

/// Compress `data` into a zlib stream.
pub fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}
