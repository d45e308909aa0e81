//! EVM memory (byte-addressable, word-aligned growth)

use devchain_primitives::U256;

use crate::error::{EvmError, EvmResult};

/// Upper bound on memory size in bytes
pub const MAX_MEMORY_SIZE: usize = 1 << 25;

/// EVM memory
///
/// Every access grows memory to cover the touched range, rounded up to a
/// 32-byte word. Growth past [`MAX_MEMORY_SIZE`] fails.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Grow memory to cover `offset..offset + size`; a zero-size range never grows
    pub fn expand(&mut self, offset: usize, size: usize) -> EvmResult<()> {
        if size == 0 {
            return Ok(());
        }

        let end = offset
            .checked_add(size)
            .filter(|end| *end <= MAX_MEMORY_SIZE)
            .ok_or(EvmError::InvalidMemoryAccess)?;

        if end > self.data.len() {
            self.data.resize(end.div_ceil(32) * 32, 0);
        }
        Ok(())
    }

    /// Load a 32-byte word
    pub fn load(&mut self, offset: usize) -> EvmResult<U256> {
        self.expand(offset, 32)?;
        Ok(U256::from_big_endian(&self.data[offset..offset + 32]))
    }

    /// Store a 32-byte word
    pub fn store(&mut self, offset: usize, value: U256) -> EvmResult<()> {
        self.expand(offset, 32)?;
        value.to_big_endian(&mut self.data[offset..offset + 32]);
        Ok(())
    }

    /// Store a single byte
    pub fn store8(&mut self, offset: usize, value: u8) -> EvmResult<()> {
        self.expand(offset, 1)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Read a byte range
    pub fn load_slice(&mut self, offset: usize, size: usize) -> EvmResult<Vec<u8>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        self.expand(offset, size)?;
        Ok(self.data[offset..offset + size].to_vec())
    }

    /// Write a byte range
    pub fn store_slice(&mut self, offset: usize, data: &[u8]) -> EvmResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.expand(offset, data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy within memory (MCOPY); overlapping ranges behave like memmove
    pub fn copy(&mut self, dest: usize, src: usize, size: usize) -> EvmResult<()> {
        if size == 0 {
            return Ok(());
        }
        self.expand(dest.max(src), size)?;
        self.data.copy_within(src..src + size, dest);
        Ok(())
    }

    /// Raw contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_expand_word_alignment() {
        let mut mem = Memory::new();
        mem.expand(0, 1).unwrap();
        assert_eq!(mem.size(), 32);
        mem.expand(0, 33).unwrap();
        assert_eq!(mem.size(), 64);
        mem.expand(10, 10).unwrap();
        assert_eq!(mem.size(), 64);
    }

    #[test]
    fn test_memory_expand_zero_size() {
        let mut mem = Memory::new();
        mem.expand(1_000_000, 0).unwrap();
        assert_eq!(mem.size(), 0);
    }

    #[test]
    fn test_memory_cap() {
        let mut mem = Memory::new();
        assert_eq!(mem.expand(MAX_MEMORY_SIZE, 1), Err(EvmError::InvalidMemoryAccess));
        assert_eq!(mem.expand(usize::MAX, 2), Err(EvmError::InvalidMemoryAccess));
        assert_eq!(mem.size(), 0);
    }

    #[test]
    fn test_memory_store_load() {
        let mut mem = Memory::new();
        let value = U256::from(0xDEADBEEFu64);
        mem.store(0, value).unwrap();
        assert_eq!(mem.load(0).unwrap(), value);
        assert_eq!(&mem.data()[28..32], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_memory_load_uninitialized_expands() {
        let mut mem = Memory::new();
        assert_eq!(mem.load(40).unwrap(), U256::zero());
        assert_eq!(mem.size(), 96);
    }

    #[test]
    fn test_memory_store8() {
        let mut mem = Memory::new();
        mem.store8(5, 0xAB).unwrap();
        assert_eq!(mem.data()[5], 0xAB);
        assert_eq!(mem.size(), 32);
    }

    #[test]
    fn test_memory_slices() {
        let mut mem = Memory::new();
        mem.store_slice(2, &[1, 2, 3]).unwrap();
        assert_eq!(mem.load_slice(1, 5).unwrap(), vec![0, 1, 2, 3, 0]);
        assert!(mem.load_slice(500, 0).unwrap().is_empty());
        assert_eq!(mem.size(), 32);
    }

    #[test]
    fn test_memory_copy_overlapping() {
        let mut mem = Memory::new();
        mem.store_slice(0, &[1, 2, 3, 4]).unwrap();
        mem.copy(1, 0, 4).unwrap();
        assert_eq!(&mem.data()[..5], &[1, 1, 2, 3, 4]);
        mem.copy(0, 1, 4).unwrap();
        assert_eq!(&mem.data()[..5], &[1, 2, 3, 4, 4]);
    }
}
