//! Growable linear memory shared by code and data.

use crate::error::MemoryError;
use tracing::debug;

/// The VM's whole address space. Cells past the end read as zero and
/// spring into existence on first access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
}

impl Memory {
    /// Create memory holding `cells` from address 0.
    pub fn new(cells: Vec<i64>) -> Self {
        Self { cells }
    }

    /// Overwrite memory with `cells`, dropping everything previously stored.
    pub fn load(&mut self, cells: &[i64]) {
        self.cells.clear();
        self.cells.extend_from_slice(cells);
    }

    /// Read a cell, growing the store if `address` is past the end.
    pub fn read(&mut self, address: usize) -> Result<i64, MemoryError> {
        self.ensure(address)?;
        Ok(self.cells[address])
    }

    /// Write a cell, growing the store if `address` is past the end.
    pub fn write(&mut self, address: usize, value: i64) -> Result<(), MemoryError> {
        self.ensure(address)?;
        self.cells[address] = value;
        Ok(())
    }

    /// Current backing length in cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Grow by doubling until `address` is in bounds. New cells are zero.
    ///
    /// Fails without touching the store if the allocation is refused.
    fn ensure(&mut self, address: usize) -> Result<(), MemoryError> {
        if address < self.cells.len() {
            return Ok(());
        }
        let mut new_len = self.cells.len().max(1);
        while new_len <= address {
            new_len = new_len.checked_mul(2).ok_or(MemoryError { address })?;
        }
        self.cells
            .try_reserve_exact(new_len - self.cells.len())
            .map_err(|_| MemoryError { address })?;
        debug!(from = self.cells.len(), to = new_len, address, "growing memory");
        self.cells.resize(new_len, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_in_bounds() {
        let mut memory = Memory::new(vec![1, 2, 3]);
        assert_eq!(memory.read(2), Ok(3));
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn read_past_end_is_zero_and_grows() {
        let mut memory = Memory::new(vec![1, 2, 3]);
        assert_eq!(memory.read(10), Ok(0));
        assert!(memory.len() > 10);
        assert_eq!(&memory.as_slice()[..3], &[1, 2, 3]);
    }

    #[test]
    fn growth_doubles() {
        let mut memory = Memory::new(vec![7; 4]);
        memory.write(4, 1).unwrap();
        assert_eq!(memory.len(), 8);
        memory.write(20, 1).unwrap();
        assert_eq!(memory.len(), 32);
    }

    #[test]
    fn empty_memory_grows() {
        let mut memory = Memory::default();
        assert!(memory.is_empty());
        memory.write(0, 5).unwrap();
        assert_eq!(memory.read(0), Ok(5));
        memory.write(100, 6).unwrap();
        assert_eq!(memory.read(100), Ok(6));
        assert_eq!(memory.read(0), Ok(5));
    }

    #[test]
    fn unallocatable_address_is_refused() {
        let mut memory = Memory::new(vec![1, 2, 3]);
        let far = 1usize << 62;
        assert_eq!(memory.write(far, 1), Err(MemoryError { address: far }));
        assert_eq!(memory.read(usize::MAX), Err(MemoryError { address: usize::MAX }));
        assert_eq!(memory.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn load_replaces_contents() {
        let mut memory = Memory::new(vec![1; 64]);
        memory.load(&[9, 9]);
        assert_eq!(memory.as_slice(), &[9, 9]);
    }
}
