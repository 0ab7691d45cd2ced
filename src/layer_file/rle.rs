//! Run-length coding of one layer bitmap.
//!
//! Each byte is one run: `0x80 | n` encodes `n` set pixels, `n < 0x80` encodes
//! `n` clear pixels.

use bitvec::prelude::*;

use crate::core::{Error, Result};

const SET_FLAG: u8 = 0x80;
const MAX_RUN: usize = 0x7f;

/// Decode `samples` pixels from `data`, appending them to `out`.
///
/// Returns the number of bytes consumed. Bytes after the last needed run are
/// left untouched.
pub fn decode_layer(data: &[u8], samples: usize, out: &mut BitVec) -> Result<usize> {
    let mut produced = 0usize;
    let mut consumed = 0usize;

    while produced < samples {
        let Some(&byte) = data.get(consumed) else {
            return Err(Error::Format(format!(
                "layer data ended after {} of {} pixels",
                produced, samples
            )));
        };
        consumed += 1;

        let (value, run) = if byte >= SET_FLAG {
            (true, (byte - SET_FLAG) as usize)
        } else {
            (false, byte as usize)
        };
        if produced + run > samples {
            return Err(Error::Format(format!(
                "run of {} at pixel {} overruns a {}-pixel layer",
                run, produced, samples
            )));
        }
        out.resize(out.len() + run, value);
        produced += run;
    }
    Ok(consumed)
}

/// Encode a layer bitmap, splitting runs longer than 127 pixels.
pub fn encode_layer(bits: &BitSlice) -> Vec<u8> {
    let mut data = Vec::new();
    let mut i = 0;
    while i < bits.len() {
        let value = bits[i];
        let mut run = 1;
        while run < MAX_RUN && i + run < bits.len() && bits[i + run] == value {
            run += 1;
        }
        data.push(if value { SET_FLAG | run as u8 } else { run as u8 });
        i += run;
    }
    data
}
