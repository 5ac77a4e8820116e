//! TIFF file construction
//!
//! Builds single- or multi-directory uncompressed little-endian TIFF
//! files whose tags describe a frame's shape and sample type, readable
//! back by this crate's decoder with identical shape, type and content.
//! Writing a valid TIFF requires careful management of offsets, ordering
//! and alignment, so all positions are calculated up front and the file
//! is emitted strictly front to back.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::tiff::constants::{compression, field_types, header, photometric, planar_config, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::DecodedFrame;
use crate::tiff::layout::{FrameLayout, FrameShape};
use crate::utils::write_utils;

/// Fixed entry set written per directory, sorted by tag as the TIFF
/// specification requires
const ENTRIES_PER_IFD: u64 = 11;

/// Classic IFD size: entry count + entries + next-IFD offset
const IFD_SIZE: u64 = 2 + ENTRIES_PER_IFD * 12 + 4;

/// A raw directory entry ready for serialization
struct RawEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value: [u8; 4],
}

impl RawEntry {
    fn short(tag: u16, value: u16) -> Self {
        let mut raw = [0u8; 4];
        raw[..2].copy_from_slice(&value.to_le_bytes());
        RawEntry { tag, field_type: field_types::SHORT, count: 1, value: raw }
    }

    fn long(tag: u16, value: u32) -> Self {
        RawEntry { tag, field_type: field_types::LONG, count: 1, value: value.to_le_bytes() }
    }

    /// SHORT array entry; inline-packed when it fits the value field,
    /// otherwise pointing at external data
    fn short_array(tag: u16, values: &[u16], external_offset: Option<u64>) -> Self {
        let mut raw = [0u8; 4];
        match external_offset {
            Some(offset) => raw.copy_from_slice(&(offset as u32).to_le_bytes()),
            None => {
                for (i, v) in values.iter().enumerate() {
                    raw[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
                }
            }
        }
        RawEntry { tag, field_type: field_types::SHORT, count: values.len() as u32, value: raw }
    }

    /// LONG array entry; inline when single-valued, external otherwise
    fn long_array(tag: u16, values: &[u32], external_offset: Option<u64>) -> Self {
        let raw = match external_offset {
            Some(offset) => (offset as u32).to_le_bytes(),
            None => values[0].to_le_bytes(),
        };
        RawEntry { tag, field_type: field_types::LONG, count: values.len() as u32, value: raw }
    }
}

/// One page queued for writing
struct Page {
    layout: FrameLayout,
    data: Vec<u8>,
}

/// Planned data-region positions for one page
struct PagePlan {
    bits_offset: Option<u64>,
    format_offset: Option<u64>,
    strip_table_offset: Option<(u64, u64)>,
    strip_offsets: Vec<u32>,
    strip_counts: Vec<u32>,
    data_offset: u64,
}

/// Builder for creating TIFF stack files
pub struct TiffBuilder {
    pages: Vec<Page>,
    rows_per_strip: Option<usize>,
}

impl TiffBuilder {
    /// Create a new TIFF builder
    pub fn new() -> Self {
        TiffBuilder { pages: Vec::new(), rows_per_strip: None }
    }

    /// Split each page's pixel data into strips of this many rows
    ///
    /// By default each page is written as one strip.
    pub fn with_rows_per_strip(mut self, rows: usize) -> Self {
        self.rows_per_strip = Some(rows.max(1));
        self
    }

    /// Queue a frame as the next directory of the file
    pub fn add_frame(&mut self, layout: FrameLayout, data: Vec<u8>) -> TiffResult<usize> {
        if data.len() != layout.byte_len() {
            return Err(TiffError::GenericError(format!(
                "Pixel buffer holds {} bytes but the layout needs {}",
                data.len(),
                layout.byte_len()
            )));
        }

        let index = self.pages.len();
        self.pages.push(Page { layout, data });
        Ok(index)
    }

    /// Queue a previously decoded frame as the next directory
    pub fn add_decoded(&mut self, frame: &DecodedFrame) -> TiffResult<usize> {
        self.add_frame(*frame.layout(), frame.bytes().to_vec())
    }

    /// Write the queued directories to disk
    pub fn write<P: AsRef<Path>>(&self, path: P) -> TiffResult<()> {
        let path = path.as_ref();
        info!("Writing {} directories to {}", self.pages.len(), path.display());

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the queued directories to any byte sink
    pub fn write_to<W: Write>(&self, writer: &mut W) -> TiffResult<()> {
        if self.pages.is_empty() {
            return Err(TiffError::GenericError(
                "No frames queued for writing".to_string(),
            ));
        }

        let plans = self.plan_offsets();

        self.write_header(writer)?;
        self.write_ifds(writer, &plans)?;
        self.write_data_region(writer, &plans)?;

        Ok(())
    }

    /// Byte size of one strip row for a page, in file order
    fn strip_row_bytes(page: &Page) -> usize {
        let shape = page.layout.shape;
        let per_row = shape.width() * page.layout.dtype.byte_size();
        match shape {
            FrameShape::Interleaved { samples, .. } => per_row * samples,
            _ => per_row,
        }
    }

    /// Split a page's byte buffer into strip byte counts
    fn strip_sizes(&self, page: &Page) -> Vec<usize> {
        let total = page.data.len();
        let strip_len = match self.rows_per_strip {
            Some(rows) => rows * Self::strip_row_bytes(page),
            None => total,
        };

        if strip_len == 0 || strip_len >= total {
            return vec![total];
        }

        let mut sizes = Vec::with_capacity(total.div_ceil(strip_len));
        let mut remaining = total;
        while remaining > 0 {
            let size = remaining.min(strip_len);
            sizes.push(size);
            remaining -= size;
        }
        sizes
    }

    /// Reserves data-region space for a SHORT array, returning its offset
    /// when it outgrows the 4-byte inline value field
    fn reserve_short_array(offset: &mut u64, count: usize) -> Option<u64> {
        if count * 2 > 4 {
            let at = *offset;
            *offset = write_utils::align_to_4_bytes(*offset + (count * 2) as u64);
            Some(at)
        } else {
            None
        }
    }

    /// Calculate every external-data and pixel-data position up front
    fn plan_offsets(&self) -> Vec<PagePlan> {
        let mut offset = header::HEADER_SIZE + IFD_SIZE * self.pages.len() as u64;
        let mut plans = Vec::with_capacity(self.pages.len());

        for page in &self.pages {
            let samples = page.layout.shape.samples();

            let bits_offset = Self::reserve_short_array(&mut offset, samples);
            let format_offset = Self::reserve_short_array(&mut offset, samples);

            let sizes = self.strip_sizes(page);
            let strip_table_offset = if sizes.len() > 1 {
                let offsets_at = offset;
                offset = write_utils::align_to_4_bytes(offset + (sizes.len() * 4) as u64);
                let counts_at = offset;
                offset = write_utils::align_to_4_bytes(offset + (sizes.len() * 4) as u64);
                Some((offsets_at, counts_at))
            } else {
                None
            };

            let data_offset = offset;
            let mut strip_offsets = Vec::with_capacity(sizes.len());
            let mut at = data_offset;
            for &size in &sizes {
                strip_offsets.push(at as u32);
                at += size as u64;
            }
            offset = write_utils::align_to_4_bytes(at);

            plans.push(PagePlan {
                bits_offset,
                format_offset,
                strip_table_offset,
                strip_offsets,
                strip_counts: sizes.iter().map(|&s| s as u32).collect(),
                data_offset,
            });
        }

        plans
    }

    /// Write the classic TIFF header, always little-endian
    fn write_header(&self, writer: &mut impl Write) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;
        writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
        writer.write_all(&(header::HEADER_SIZE as u32).to_le_bytes())?;
        Ok(())
    }

    /// Write all IFDs, chained in order
    fn write_ifds(&self, writer: &mut impl Write, plans: &[PagePlan]) -> TiffResult<()> {
        for (i, (page, plan)) in self.pages.iter().zip(plans).enumerate() {
            let next_offset = if i + 1 < self.pages.len() {
                header::HEADER_SIZE + IFD_SIZE * (i + 1) as u64
            } else {
                0
            };

            let entries = self.page_entries(page, plan);
            debug_assert_eq!(entries.len() as u64, ENTRIES_PER_IFD);

            writer.write_all(&(entries.len() as u16).to_le_bytes())?;
            for entry in &entries {
                writer.write_all(&entry.tag.to_le_bytes())?;
                writer.write_all(&entry.field_type.to_le_bytes())?;
                writer.write_all(&entry.count.to_le_bytes())?;
                writer.write_all(&entry.value)?;
            }
            writer.write_all(&(next_offset as u32).to_le_bytes())?;
        }

        Ok(())
    }

    /// Write external tag arrays and pixel data, front to back
    ///
    /// Tracks the absolute file position so padding aligns to the same
    /// boundaries `plan_offsets` planned against. The IFD region is not
    /// a multiple of 4, so region lengths alone cannot decide padding.
    fn write_data_region(&self, writer: &mut impl Write, plans: &[PagePlan]) -> TiffResult<()> {
        let mut pos = header::HEADER_SIZE + IFD_SIZE * self.pages.len() as u64;

        for (page, plan) in self.pages.iter().zip(plans) {
            let samples = page.layout.shape.samples();

            if plan.bits_offset.is_some() {
                let bits = vec![page.layout.dtype.bits(); samples];
                pos = Self::write_short_array(writer, &bits, pos)?;
            }
            if plan.format_offset.is_some() {
                let formats = vec![page.layout.dtype.sample_format(); samples];
                pos = Self::write_short_array(writer, &formats, pos)?;
            }
            if plan.strip_table_offset.is_some() {
                pos = Self::write_long_array(writer, &plan.strip_offsets, pos)?;
                pos = Self::write_long_array(writer, &plan.strip_counts, pos)?;
            }

            debug_assert_eq!(pos, plan.data_offset);
            writer.write_all(&page.data)?;
            pos = write_utils::pad_to_alignment(writer, pos + page.data.len() as u64)?;
        }

        Ok(())
    }

    /// Writes a SHORT array at `pos`, returning the aligned position after it
    fn write_short_array(writer: &mut impl Write, values: &[u16], pos: u64) -> TiffResult<u64> {
        let mut data = Vec::with_capacity(values.len() * 2);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        writer.write_all(&data)?;
        write_utils::pad_to_alignment(writer, pos + data.len() as u64)
    }

    /// Writes a LONG array at `pos`, returning the aligned position after it
    fn write_long_array(writer: &mut impl Write, values: &[u32], pos: u64) -> TiffResult<u64> {
        let mut data = Vec::with_capacity(values.len() * 4);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        writer.write_all(&data)?;
        write_utils::pad_to_alignment(writer, pos + data.len() as u64)
    }

    /// Assemble the entry table for one page, sorted by tag
    fn page_entries(&self, page: &Page, plan: &PagePlan) -> Vec<RawEntry> {
        let shape = page.layout.shape;
        let dtype = page.layout.dtype;
        let samples = shape.samples();

        let bits = vec![dtype.bits(); samples];
        let formats = vec![dtype.sample_format(); samples];

        let planar = match shape {
            FrameShape::Planar { .. } => planar_config::SEPARATE,
            _ => planar_config::CONTIG,
        };

        let rows_per_strip = self
            .rows_per_strip
            .unwrap_or(shape.height().max(1))
            .min(shape.height().max(1)) as u32;

        let (offsets_ext, counts_ext) = match plan.strip_table_offset {
            Some((offsets_at, counts_at)) => (Some(offsets_at), Some(counts_at)),
            None => (None, None),
        };

        vec![
            RawEntry::long(tags::IMAGE_WIDTH, shape.width() as u32),
            RawEntry::long(tags::IMAGE_LENGTH, shape.height() as u32),
            RawEntry::short_array(tags::BITS_PER_SAMPLE, &bits, plan.bits_offset),
            RawEntry::short(tags::COMPRESSION, compression::NONE),
            RawEntry::short(tags::PHOTOMETRIC_INTERPRETATION, photometric::BLACK_IS_ZERO),
            RawEntry::long_array(tags::STRIP_OFFSETS, &plan.strip_offsets, offsets_ext),
            RawEntry::short(tags::SAMPLES_PER_PIXEL, samples as u16),
            RawEntry::long(tags::ROWS_PER_STRIP, rows_per_strip),
            RawEntry::long_array(tags::STRIP_BYTE_COUNTS, &plan.strip_counts, counts_ext),
            RawEntry::short(tags::PLANAR_CONFIGURATION, planar),
            RawEntry::short_array(tags::SAMPLE_FORMAT, &formats, plan.format_offset),
        ]
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a single frame as a one-directory TIFF file
pub fn save_frame<P: AsRef<Path>>(path: P, frame: &DecodedFrame) -> TiffResult<()> {
    let mut builder = TiffBuilder::new();
    builder.add_decoded(frame)?;
    builder.write(path)
}
