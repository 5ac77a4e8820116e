//! Frame geometry and sample layout resolution
//!
//! Derives the pixel array shape and sample type of a directory from its
//! tag values. The result is cached by the stack readers under the
//! explicit assumption that every directory of a sequence shares the
//! layout of the first one read.

use log::debug;

use crate::tiff::constants::{compression, planar_config, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::handle::TiffHandle;

/// Element type of a decoded pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl SampleType {
    /// Picks the sample type for a BitsPerSample / SampleFormat pair
    ///
    /// Fails with `UnsupportedSampleType` for combinations this decoder
    /// cannot represent (e.g. 8-bit float, sub-byte depths).
    pub fn from_tags(bits: u64, format: u64) -> TiffResult<Self> {
        let unsupported = TiffError::UnsupportedSampleType { bits, format };

        match format as u16 {
            sample_format::UNSIGNED => match bits {
                8 => Ok(SampleType::U8),
                16 => Ok(SampleType::U16),
                32 => Ok(SampleType::U32),
                64 => Ok(SampleType::U64),
                _ => Err(unsupported),
            },
            sample_format::SIGNED => match bits {
                8 => Ok(SampleType::I8),
                16 => Ok(SampleType::I16),
                32 => Ok(SampleType::I32),
                64 => Ok(SampleType::I64),
                _ => Err(unsupported),
            },
            sample_format::IEEEFP => match bits {
                32 => Ok(SampleType::F32),
                64 => Ok(SampleType::F64),
                _ => Err(unsupported),
            },
            _ => Err(unsupported),
        }
    }

    /// Size of one sample in bytes
    pub fn byte_size(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::U64 | SampleType::I64 | SampleType::F64 => 8,
        }
    }

    /// BitsPerSample value for this type
    pub fn bits(&self) -> u16 {
        (self.byte_size() * 8) as u16
    }

    /// SampleFormat tag value for this type
    pub fn sample_format(&self) -> u16 {
        match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 | SampleType::U64 => {
                sample_format::UNSIGNED
            }
            SampleType::I8 | SampleType::I16 | SampleType::I32 | SampleType::I64 => {
                sample_format::SIGNED
            }
            SampleType::F32 | SampleType::F64 => sample_format::IEEEFP,
        }
    }

    /// Short type name, e.g. "u16"
    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "u8",
            SampleType::U16 => "u16",
            SampleType::U32 => "u32",
            SampleType::U64 => "u64",
            SampleType::I8 => "i8",
            SampleType::I16 => "i16",
            SampleType::I32 => "i32",
            SampleType::I64 => "i64",
            SampleType::F32 => "f32",
            SampleType::F64 => "f64",
        }
    }
}

/// Dimensions and sample-interleaving order of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameShape {
    /// Single-sample image, (height, width)
    Gray { height: usize, width: usize },
    /// Multi-sample image with per-pixel interleaving, (height, width, samples)
    Interleaved { height: usize, width: usize, samples: usize },
    /// Multi-sample image stored as full-size planes, (samples, height, width)
    Planar { samples: usize, height: usize, width: usize },
}

impl FrameShape {
    /// Total number of samples in the frame
    pub fn sample_count(&self) -> usize {
        match *self {
            FrameShape::Gray { height, width } => height * width,
            FrameShape::Interleaved { height, width, samples }
            | FrameShape::Planar { samples, height, width } => height * width * samples,
        }
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        match *self {
            FrameShape::Gray { height, .. }
            | FrameShape::Interleaved { height, .. }
            | FrameShape::Planar { height, .. } => height,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        match *self {
            FrameShape::Gray { width, .. }
            | FrameShape::Interleaved { width, .. }
            | FrameShape::Planar { width, .. } => width,
        }
    }

    /// Samples per pixel
    pub fn samples(&self) -> usize {
        match *self {
            FrameShape::Gray { .. } => 1,
            FrameShape::Interleaved { samples, .. }
            | FrameShape::Planar { samples, .. } => samples,
        }
    }

    /// Dimension tuple in index order
    pub fn dims(&self) -> Vec<usize> {
        match *self {
            FrameShape::Gray { height, width } => vec![height, width],
            FrameShape::Interleaved { height, width, samples } => vec![height, width, samples],
            FrameShape::Planar { samples, height, width } => vec![samples, height, width],
        }
    }
}

/// Derived per-directory pixel layout: shape plus sample type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub shape: FrameShape,
    pub dtype: SampleType,
}

impl FrameLayout {
    /// Exact byte size of a frame with this layout
    pub fn byte_len(&self) -> usize {
        self.shape.sample_count() * self.dtype.byte_size()
    }
}

/// Resolves the frame layout of the handle's current directory
///
/// Pure function of the directory's tag values:
/// required ImageLength/ImageWidth, SamplesPerPixel defaulting to 1,
/// BitsPerSample defaulting to 8, SampleFormat defaulting to unsigned,
/// PlanarConfiguration defaulting to contiguous. Any compression other
/// than NONE is rejected because the strip decoder reads raw bytes.
pub fn resolve_layout(handle: &mut TiffHandle) -> TiffResult<FrameLayout> {
    let (height, width) = handle.dimensions()?;

    let samples = handle.get_field(tags::SAMPLES_PER_PIXEL)?.unwrap_or(1) as usize;
    let bits = handle.get_field(tags::BITS_PER_SAMPLE)?.unwrap_or(8);
    let format = handle
        .get_field(tags::SAMPLE_FORMAT)?
        .unwrap_or(sample_format::UNSIGNED as u64);
    let dtype = SampleType::from_tags(bits, format)?;

    if let Some(value) = handle.get_field(tags::COMPRESSION)? {
        if value != compression::NONE as u64 {
            return Err(TiffError::UnsupportedCompression(value));
        }
    }

    let planar = handle
        .get_field(tags::PLANAR_CONFIGURATION)?
        .unwrap_or(planar_config::CONTIG as u64);

    let shape = if samples == 1 {
        FrameShape::Gray { height, width }
    } else if planar == planar_config::CONTIG as u64 {
        FrameShape::Interleaved { height, width, samples }
    } else if planar == planar_config::SEPARATE as u64 {
        FrameShape::Planar { samples, height, width }
    } else {
        return Err(TiffError::UnexpectedPlanarConfig(planar));
    };

    let layout = FrameLayout { shape, dtype };
    debug!("Resolved layout: {:?} {} ({} bytes)", shape, dtype.name(), layout.byte_len());
    Ok(layout)
}
