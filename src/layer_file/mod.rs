//! Sliced layer files: fixed header, layer table, RLE bitmaps.
//!
//! Decoding works on an in-memory byte slice; reading the file is up to the
//! caller. Layer `i` of the table becomes Z slice `i` of the grid.

pub mod header;
pub mod rle;

pub use header::{LayerFileHeader, LayerRecord};

use bitvec::prelude::*;

use crate::core::{Error, ProgressChannel, Result};
use crate::voxel::VoxelGrid;
use header::{HEADER_SIZE, LAYER_RECORD_SIZE, RawHeader, RawLayer};

/// A decoded layer file.
#[derive(Clone, Debug)]
pub struct LayerFile {
    pub header: LayerFileHeader,
    pub layers: Vec<LayerRecord>,
    bits: BitVec,
}

impl LayerFile {
    /// Decode header, layer table and every layer bitmap.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::Format(format!(
                "file is {} bytes, header needs {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }
        let raw: RawHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_SIZE]);
        let header = LayerFileHeader::from(&raw);

        let samples = header.res_x as usize * header.res_y as usize;
        if samples == 0 {
            return Err(Error::Format(format!(
                "resolution {}x{} has no pixels",
                header.res_x, header.res_y
            )));
        }

        let table_start = header.layers_offset as usize;
        let table_end = (header.layer_count as usize)
            .checked_mul(LAYER_RECORD_SIZE)
            .and_then(|len| len.checked_add(table_start))
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| Error::Format(format!(
                "layer table of {} records at offset {} exceeds {} bytes",
                header.layer_count,
                table_start,
                bytes.len()
            )))?;

        let layers: Vec<LayerRecord> = bytes[table_start..table_end]
            .chunks_exact(LAYER_RECORD_SIZE)
            .map(|chunk| LayerRecord::from(&bytemuck::pod_read_unaligned::<RawLayer>(chunk)))
            .collect();

        let mut bits = BitVec::with_capacity(samples * layers.len());
        for (z, layer) in layers.iter().enumerate() {
            let start = layer.data_offset as usize;
            let data = start
                .checked_add(layer.data_size as usize)
                .and_then(|end| bytes.get(start..end))
                .ok_or_else(|| Error::Format(format!(
                    "layer {} data ({} bytes at {}) is out of bounds",
                    z, layer.data_size, layer.data_offset
                )))?;
            rle::decode_layer(data, samples, &mut bits)
                .map_err(|err| match err {
                    Error::Format(msg) => Error::Format(format!("layer {}: {}", z, msg)),
                    other => other,
                })?;
        }

        log::debug!(
            "Decoded layer file: {}x{} px, {} layers, {} set voxels",
            header.res_x,
            header.res_y,
            layers.len(),
            bits.count_ones()
        );
        Ok(Self { header, layers, bits })
    }

    /// Dimensions of the grid this file decodes to.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.header.res_x as usize, self.header.res_y as usize, self.layers.len())
    }

    /// Decoded voxel bits, X fastest then Y then layer.
    pub fn bits(&self) -> &BitSlice {
        &self.bits
    }

    /// Build the voxel grid: X = `res_x`, Y = `res_y`, Z = layer count.
    pub fn into_grid(self, channel: &ProgressChannel) -> Result<VoxelGrid> {
        let (sx, sy, sz) = self.dims();
        VoxelGrid::new(sx, sy, sz, self.bits, None, channel)
    }

    /// Serialize a grid as a layer file. Resolution, layer count and offsets
    /// are taken from the grid; print settings come from `settings`.
    /// Layer positions advance by `layer_thickness`.
    pub fn encode(grid: &VoxelGrid, settings: &LayerFileHeader) -> Vec<u8> {
        let (sx, sy, sz) = grid.dims();
        let payloads: Vec<Vec<u8>> = (0..sz).map(|z| rle::encode_layer(&grid.get_layer(z as i32))).collect();

        let table_offset = HEADER_SIZE;
        let mut data_offset = table_offset + sz * LAYER_RECORD_SIZE;
        let header = LayerFileHeader {
            res_x: sx as u32,
            res_y: sy as u32,
            layers_offset: table_offset as u32,
            layer_count: sz as u32,
            ..settings.clone()
        };

        let mut bytes = Vec::with_capacity(data_offset + payloads.iter().map(Vec::len).sum::<usize>());
        bytes.extend_from_slice(bytemuck::bytes_of(&RawHeader::from(&header)));
        for (z, payload) in payloads.iter().enumerate() {
            let record = LayerRecord {
                position: z as f32 * settings.layer_thickness,
                exposure_time: if (z as u32) < settings.bottom_layers {
                    settings.bottom_exposure_time
                } else {
                    settings.exposure_time
                },
                off_time: settings.off_time,
                data_offset: data_offset as u32,
                data_size: payload.len() as u32,
            };
            bytes.extend_from_slice(bytemuck::bytes_of(&RawLayer::from(&record)));
            data_offset += payload.len();
        }
        for payload in &payloads {
            bytes.extend_from_slice(payload);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LayerFileHeader {
        LayerFileHeader {
            bed_size: [68.04, 120.96, 150.0],
            layer_thickness: 0.05,
            exposure_time: 8.0,
            bottom_exposure_time: 60.0,
            off_time: 1.0,
            bottom_layers: 1,
            ..Default::default()
        }
    }

    fn sample_grid() -> VoxelGrid {
        VoxelGrid::from_fn(5, 3, 4, |x, y, z| (x + y) % 2 == 0 && z != 2).unwrap()
    }

    #[test]
    fn test_encode_then_decode_grid() {
        let channel = ProgressChannel::silent();
        let grid = sample_grid();
        let bytes = LayerFile::encode(&grid, &settings());

        let file = LayerFile::decode(&bytes).unwrap();
        assert_eq!(file.dims(), (5, 3, 4));
        assert_eq!(file.header.layer_count, 4);
        assert_eq!(file.header.exposure_time, 8.0);
        assert_eq!(file.layers[0].exposure_time, 60.0);
        assert_eq!(file.layers[1].exposure_time, 8.0);
        assert!((file.layers[2].position - 0.1).abs() < 1e-6);
        assert_eq!(file.bits().len(), 5 * 3 * 4);
        assert_eq!(file.bits().count_ones(), grid.volume());

        let decoded = file.into_grid(&channel).unwrap();
        assert_eq!(decoded, grid);
        assert_eq!(decoded.bounding_box(), grid.bounding_box());
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(LayerFile::decode(&[0u8; 40]), Err(Error::Format(_))));
    }

    #[test]
    fn test_layer_table_out_of_bounds() {
        let mut bytes = LayerFile::encode(&sample_grid(), &settings());
        // Claim many more layers than the table holds
        bytes[68..72].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(LayerFile::decode(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_layer_data_out_of_bounds() {
        let mut bytes = LayerFile::encode(&sample_grid(), &settings());
        let first_record = HEADER_SIZE;
        bytes[first_record + 12..first_record + 16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(LayerFile::decode(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_short_layer_data() {
        let grid = VoxelGrid::from_fn(4, 1, 1, |x, _, _| x < 2).unwrap();
        let mut bytes = LayerFile::encode(&grid, &settings());
        // Payload [0x82, 2]; drop the final run
        let record = HEADER_SIZE;
        bytes[record + 16..record + 20].copy_from_slice(&1u32.to_le_bytes());
        let err = LayerFile::decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("layer 0"));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let mut bytes = LayerFile::encode(&sample_grid(), &settings());
        bytes[52..56].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(LayerFile::decode(&bytes), Err(Error::Format(_))));
    }
}
