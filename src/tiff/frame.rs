//! Strip-based frame decoding
//!
//! Concatenates the raw strip byte ranges of the current directory into
//! one contiguous pixel buffer matching a resolved layout. No byte-order
//! conversion, de-planarization or decompression happens here; bytes are
//! assumed to already be in the target sample type's native layout and in
//! the order dictated by the planar configuration.

use log::trace;

use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::handle::TiffHandle;
use crate::tiff::layout::{FrameLayout, FrameShape, SampleType};

/// One decoded frame: a contiguous native-order pixel buffer plus the
/// layout describing its shape and sample type
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    layout: FrameLayout,
    data: Vec<u8>,
}

impl DecodedFrame {
    /// The layout this frame was decoded with
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Shape of the pixel array
    pub fn shape(&self) -> FrameShape {
        self.layout.shape
    }

    /// Sample type of the pixel array
    pub fn dtype(&self) -> SampleType {
        self.layout.dtype
    }

    /// Raw pixel bytes in native order
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel buffer as u8 samples, `None` if the sample type differs
    pub fn as_u8(&self) -> Option<Vec<u8>> {
        match self.layout.dtype {
            SampleType::U8 => Some(self.data.clone()),
            _ => None,
        }
    }

    /// Pixel buffer as u16 samples, `None` if the sample type differs
    pub fn as_u16(&self) -> Option<Vec<u16>> {
        match self.layout.dtype {
            SampleType::U16 => Some(
                self.data
                    .chunks_exact(2)
                    .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Pixel buffer as u32 samples, `None` if the sample type differs
    pub fn as_u32(&self) -> Option<Vec<u32>> {
        match self.layout.dtype {
            SampleType::U32 => Some(
                self.data
                    .chunks_exact(4)
                    .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Pixel buffer as u64 samples, `None` if the sample type differs
    pub fn as_u64(&self) -> Option<Vec<u64>> {
        match self.layout.dtype {
            SampleType::U64 => Some(
                self.data
                    .chunks_exact(8)
                    .map(|c| {
                        u64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Pixel buffer as i16 samples, `None` if the sample type differs
    pub fn as_i16(&self) -> Option<Vec<i16>> {
        match self.layout.dtype {
            SampleType::I16 => Some(
                self.data
                    .chunks_exact(2)
                    .map(|c| i16::from_ne_bytes([c[0], c[1]]))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Pixel buffer as f32 samples, `None` if the sample type differs
    pub fn as_f32(&self) -> Option<Vec<f32>> {
        match self.layout.dtype {
            SampleType::F32 => Some(
                self.data
                    .chunks_exact(4)
                    .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Pixel buffer as f64 samples, `None` if the sample type differs
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self.layout.dtype {
            SampleType::F64 => Some(
                self.data
                    .chunks_exact(8)
                    .map(|c| {
                        f64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Builds a frame from raw pixel bytes, checking the byte size
    pub fn from_bytes(layout: FrameLayout, data: Vec<u8>) -> TiffResult<Self> {
        if data.len() != layout.byte_len() {
            return Err(TiffError::GenericError(format!(
                "Pixel buffer holds {} bytes but the layout needs {}",
                data.len(),
                layout.byte_len()
            )));
        }
        Ok(DecodedFrame { layout, data })
    }
}

/// Decodes the handle's current directory into a frame with the given layout
///
/// Iterates the directory's strips in order and appends each strip's raw
/// bytes at the running offset, clamping to the remaining capacity. If the
/// strips do not fill the buffer exactly, the decode fails with
/// `IncompleteRead` instead of returning a partially populated frame.
pub fn decode_current(handle: &mut TiffHandle, layout: &FrameLayout) -> TiffResult<DecodedFrame> {
    let expected = layout.byte_len();
    let mut data = Vec::with_capacity(expected);

    let strip_count = handle.strip_count()?;
    for strip in 0..strip_count {
        let bytes = handle.read_strip(strip)?;
        let take = bytes.len().min(expected - data.len());
        trace!("Strip {}: {} bytes, taking {}", strip, bytes.len(), take);
        data.extend_from_slice(&bytes[..take]);
    }

    if data.len() != expected {
        return Err(TiffError::IncompleteRead {
            expected,
            actual: data.len(),
        });
    }

    Ok(DecodedFrame {
        layout: *layout,
        data,
    })
}
