//! Data segment storage.
//!
//! This module implements the byte-addressable data store backing the
//! simulated machine. It performs the following:
//! 1. **Sparse Storage:** Keeps only written bytes, so the stack region far
//!    above the data base costs nothing until touched.
//! 2. **Typed Access:** Byte, halfword, word, float, and double accessors that
//!    honor the configured byte order.
//! 3. **Bounds Enforcement:** Writes outside the configured segment range and
//!    reads of unmapped bytes fail with `MemoryOutOfBounds`.

use std::collections::HashMap;

use crate::common::error::SimError;
use crate::config::Endianness;

/// The sparse data segment.
///
/// Addresses in `[base, limit)` are writable; everything else faults. A read
/// of a byte never written also faults, which is what surfaces use-before-set
/// bugs in student programs.
#[derive(Clone, Debug)]
pub struct DataSegment {
    bytes: HashMap<u32, u8>,
    base: u32,
    limit: u32,
    endianness: Endianness,
}

impl DataSegment {
    /// Creates an empty segment covering `[base, limit)` with the given byte order.
    pub fn new(base: u32, limit: u32, endianness: Endianness) -> Self {
        Self {
            bytes: HashMap::new(),
            base,
            limit,
            endianness,
        }
    }

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemoryOutOfBounds`] if `addr` is outside the segment.
    pub fn write_byte(&mut self, addr: u32, val: u8) -> Result<(), SimError> {
        if addr < self.base || addr >= self.limit {
            return Err(SimError::MemoryOutOfBounds(addr));
        }
        let _ = self.bytes.insert(addr, val);
        Ok(())
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemoryOutOfBounds`] if nothing is mapped at `addr`.
    pub fn read_byte(&self, addr: u32) -> Result<u8, SimError> {
        self.bytes
            .get(&addr)
            .copied()
            .ok_or(SimError::MemoryOutOfBounds(addr))
    }

    /// Reads one byte without failing; `None` if nothing is mapped.
    pub fn probe_byte(&self, addr: u32) -> Option<u8> {
        self.bytes.get(&addr).copied()
    }

    /// Unmaps `len` bytes starting at `addr`.
    ///
    /// Debugger support: reversing the first store to a fresh address returns
    /// the region to its unmapped state.
    pub fn clear(&mut self, addr: u32, len: u32) {
        for i in 0..len {
            let _ = self.bytes.remove(&addr.wrapping_add(i));
        }
    }

    /// Writes a 16-bit halfword in the configured byte order.
    pub fn write_half(&mut self, addr: u32, val: u16) -> Result<(), SimError> {
        let raw = match self.endianness {
            Endianness::Little => val.to_le_bytes(),
            Endianness::Big => val.to_be_bytes(),
        };
        self.write_all(addr, &raw)
    }

    /// Reads a 16-bit halfword in the configured byte order.
    pub fn read_half(&self, addr: u32) -> Result<u16, SimError> {
        let raw = [self.read_byte(addr)?, self.read_byte(addr.wrapping_add(1))?];
        Ok(match self.endianness {
            Endianness::Little => u16::from_le_bytes(raw),
            Endianness::Big => u16::from_be_bytes(raw),
        })
    }

    /// Writes a 32-bit word in the configured byte order.
    pub fn write_word(&mut self, addr: u32, val: u32) -> Result<(), SimError> {
        let raw = match self.endianness {
            Endianness::Little => val.to_le_bytes(),
            Endianness::Big => val.to_be_bytes(),
        };
        self.write_all(addr, &raw)
    }

    /// Reads a 32-bit word in the configured byte order.
    pub fn read_word(&self, addr: u32) -> Result<u32, SimError> {
        let mut raw = [0u8; 4];
        for (i, slot) in raw.iter_mut().enumerate() {
            *slot = self.read_byte(addr.wrapping_add(i as u32))?;
        }
        Ok(match self.endianness {
            Endianness::Little => u32::from_le_bytes(raw),
            Endianness::Big => u32::from_be_bytes(raw),
        })
    }

    /// Writes a 64-bit doubleword in the configured byte order.
    pub fn write_dword(&mut self, addr: u32, val: u64) -> Result<(), SimError> {
        let raw = match self.endianness {
            Endianness::Little => val.to_le_bytes(),
            Endianness::Big => val.to_be_bytes(),
        };
        self.write_all(addr, &raw)
    }

    /// Reads a 64-bit doubleword in the configured byte order.
    pub fn read_dword(&self, addr: u32) -> Result<u64, SimError> {
        let mut raw = [0u8; 8];
        for (i, slot) in raw.iter_mut().enumerate() {
            *slot = self.read_byte(addr.wrapping_add(i as u32))?;
        }
        Ok(match self.endianness {
            Endianness::Little => u64::from_le_bytes(raw),
            Endianness::Big => u64::from_be_bytes(raw),
        })
    }

    fn write_all(&mut self, addr: u32, raw: &[u8]) -> Result<(), SimError> {
        // Bounds-check the full span before the first byte lands so a
        // failing write never partially commits.
        let end = addr.wrapping_add(raw.len() as u32 - 1);
        if addr < self.base || end >= self.limit || end < addr {
            return Err(SimError::MemoryOutOfBounds(addr));
        }
        for (i, byte) in raw.iter().enumerate() {
            let _ = self.bytes.insert(addr.wrapping_add(i as u32), *byte);
        }
        Ok(())
    }
}
