//! MSB-first bit packing of codewords into a byte sink.

use std::io::Write;

use crate::codeword::{Codeword, CodewordTable};
use crate::error::{HzipError, Result};

const ACC_BITS: u32 = u64::BITS;

/// Packs codewords through a 64-bit accumulator. A codeword that does not fit
/// in the free bits is split: its high bits top off the accumulator, which is
/// flushed, and the low bits start the next word.
pub struct BitPacker<W: Write> {
    out: W,
    acc: u64,
    filled: u32,
    bits_written: u64,
}

impl<W: Write> BitPacker<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            acc: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    pub fn push(&mut self, code: Codeword) -> Result<()> {
        let mut remaining = code.len as u32;
        while remaining > 0 {
            let free = ACC_BITS - self.filled;
            let take = free.min(remaining);
            let chunk = (code.bits >> (remaining - take)) & ((1u128 << take) - 1);
            self.acc |= (chunk as u64) << (free - take);
            self.filled += take;
            remaining -= take;
            if self.filled == ACC_BITS {
                self.out.write_all(&self.acc.to_be_bytes())?;
                self.acc = 0;
                self.filled = 0;
            }
        }
        self.bits_written += code.len as u64;
        Ok(())
    }

    /// Looks up and packs every byte of `data`.
    pub fn pack(&mut self, table: &CodewordTable, data: &[u8]) -> Result<()> {
        for &byte in data {
            let code = table.get(byte).ok_or(HzipError::SourceChanged)?;
            self.push(code)?;
        }
        Ok(())
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flushes the partial word, zero-padded to a whole byte, and hands the
    /// sink back along with the number of body bytes produced.
    pub fn finish(mut self) -> Result<(W, u64)> {
        if self.filled > 0 {
            let bytes = self.filled.div_ceil(8) as usize;
            self.out.write_all(&self.acc.to_be_bytes()[..bytes])?;
        }
        Ok((self.out, self.bits_written.div_ceil(8)))
    }
}
