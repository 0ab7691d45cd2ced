//! Fixed little-endian header and layer table records.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// On-disk header - exactly 76 bytes, all words little-endian
///
/// Layout:
/// - magic/version (8 bytes): not interpreted
/// - bed_size (12 bytes): X/Y/Z in mm, f32
/// - reserved (12 bytes)
/// - layer_thickness, exposure, bottom_exposure, off_time (16 bytes): f32
/// - bottom_layers, res_x, res_y (12 bytes): u32
/// - big_thumbnail_offset (4 bytes): ignored
/// - layers_offset, layer_count (8 bytes): u32
/// - small_thumbnail_offset (4 bytes): ignored
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct RawHeader {
    _magic: [u32; 2],
    pub bed_size: [u32; 3],
    _reserved: [u32; 3],
    pub layer_thickness: u32,
    pub exposure_time: u32,
    pub bottom_exposure_time: u32,
    pub off_time: u32,
    pub bottom_layers: u32,
    pub res_x: u32,
    pub res_y: u32,
    _big_thumbnail_offset: u32,
    pub layers_offset: u32,
    pub layer_count: u32,
    _small_thumbnail_offset: u32,
}

pub(crate) const HEADER_SIZE: usize = std::mem::size_of::<RawHeader>();

/// On-disk layer table entry - exactly 36 bytes
///
/// Layout:
/// - position, exposure_time, off_time (12 bytes): f32
/// - data_offset, data_size (8 bytes): u32, RLE payload location
/// - reserved (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct RawLayer {
    pub position: u32,
    pub exposure_time: u32,
    pub off_time: u32,
    pub data_offset: u32,
    pub data_size: u32,
    _reserved: [u32; 4],
}

pub(crate) const LAYER_RECORD_SIZE: usize = std::mem::size_of::<RawLayer>();

fn f32_le(word: u32) -> f32 {
    f32::from_bits(u32::from_le(word))
}

fn f32_to_le(value: f32) -> u32 {
    value.to_bits().to_le()
}

/// Decoded print settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerFileHeader {
    /// Build volume in mm
    pub bed_size: [f32; 3],
    /// mm
    pub layer_thickness: f32,
    /// Seconds
    pub exposure_time: f32,
    pub bottom_exposure_time: f32,
    pub off_time: f32,
    pub bottom_layers: u32,
    pub res_x: u32,
    pub res_y: u32,
    pub layers_offset: u32,
    pub layer_count: u32,
}

impl From<&RawHeader> for LayerFileHeader {
    fn from(raw: &RawHeader) -> Self {
        Self {
            bed_size: raw.bed_size.map(f32_le),
            layer_thickness: f32_le(raw.layer_thickness),
            exposure_time: f32_le(raw.exposure_time),
            bottom_exposure_time: f32_le(raw.bottom_exposure_time),
            off_time: f32_le(raw.off_time),
            bottom_layers: u32::from_le(raw.bottom_layers),
            res_x: u32::from_le(raw.res_x),
            res_y: u32::from_le(raw.res_y),
            layers_offset: u32::from_le(raw.layers_offset),
            layer_count: u32::from_le(raw.layer_count),
        }
    }
}

impl From<&LayerFileHeader> for RawHeader {
    fn from(header: &LayerFileHeader) -> Self {
        Self {
            bed_size: header.bed_size.map(f32_to_le),
            layer_thickness: f32_to_le(header.layer_thickness),
            exposure_time: f32_to_le(header.exposure_time),
            bottom_exposure_time: f32_to_le(header.bottom_exposure_time),
            off_time: f32_to_le(header.off_time),
            bottom_layers: header.bottom_layers.to_le(),
            res_x: header.res_x.to_le(),
            res_y: header.res_y.to_le(),
            layers_offset: header.layers_offset.to_le(),
            layer_count: header.layer_count.to_le(),
            ..Zeroable::zeroed()
        }
    }
}

/// One layer table entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    /// Z height in mm
    pub position: f32,
    pub exposure_time: f32,
    pub off_time: f32,
    pub data_offset: u32,
    pub data_size: u32,
}

impl From<&RawLayer> for LayerRecord {
    fn from(raw: &RawLayer) -> Self {
        Self {
            position: f32_le(raw.position),
            exposure_time: f32_le(raw.exposure_time),
            off_time: f32_le(raw.off_time),
            data_offset: u32::from_le(raw.data_offset),
            data_size: u32::from_le(raw.data_size),
        }
    }
}

impl From<&LayerRecord> for RawLayer {
    fn from(record: &LayerRecord) -> Self {
        Self {
            position: f32_to_le(record.position),
            exposure_time: f32_to_le(record.exposure_time),
            off_time: f32_to_le(record.off_time),
            data_offset: record.data_offset.to_le(),
            data_size: record.data_size.to_le(),
            ..Zeroable::zeroed()
        }
    }
}
