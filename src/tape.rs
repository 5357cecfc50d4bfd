//! The tape is the machine's only memory: the loaded program followed by zero-filled scratch
//! space. The scratch allocation is a starting size, not a ceiling. Writes past the end grow the
//! tape, and reads past the end see zero, the value every unwritten cell holds.
//!
//! Growth is contiguous only up to `MAX_DENSE_CELLS`. Cells written at addresses beyond that are
//! kept in a sparse map, so a program writing to a huge address costs one entry, not a vector
//! of that length.

use std::collections::HashMap;

use crate::address::Address;
use crate::Value;

/// Scratch space is never smaller than this many cells.
pub const MIN_SCRATCH_CELLS: usize = 1024;
/// Scratch space is at least this multiple of the program length.
pub const SCRATCH_PROGRAM_FACTOR: usize = 3;
/// Writes below this address grow the contiguous tape; writes at or above it go to the sparse map.
pub const MAX_DENSE_CELLS: usize = 1 << 22;

/// The number of zero cells appended after a program of the given length.
pub fn scratch_size(program_len: usize) -> usize {
  std::cmp::max(MIN_SCRATCH_CELLS, SCRATCH_PROGRAM_FACTOR * program_len)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tape {
  cells  : Vec<Value>,
  sparse : HashMap<usize, Value>
}

impl Tape {

  pub fn new(program: &[Value]) -> Tape {
    let mut cells = Vec::with_capacity(program.len() + scratch_size(program.len()));
    cells.extend_from_slice(program);
    cells.resize(program.len() + scratch_size(program.len()), 0);
    Tape { cells, sparse: HashMap::new() }
  }

  /**
    Restores the tape to the state `Tape::new(program)` would produce, reusing the existing
    allocation where it is large enough.
  */
  pub fn reload(&mut self, program: &[Value]) {
    self.cells.clear();
    self.cells.extend_from_slice(program);
    self.cells.resize(program.len() + scratch_size(program.len()), 0);
    self.sparse.clear();
  }

  /// The length of the contiguous part of the tape. Sparse cells are not counted.
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// The contiguous part of the tape.
  pub fn cells(&self) -> &[Value] {
    &self.cells
  }

  /// The number of cells held outside the contiguous part.
  pub fn sparse_len(&self) -> usize {
    self.sparse.len()
  }

  pub fn read(&self, address: Address) -> Value {
    match self.cells.get(address.idx()) {
      Some(value) => *value,
      None        => self.sparse.get(&address.idx()).copied().unwrap_or(0)
    }
  }

  /// Sets the value at the given address, growing the tape if the address is past its end.
  pub fn write(&mut self, address: Address, value: Value) {
    let idx = address.idx();
    if idx < self.cells.len() {
      self.cells[idx] = value;
    } else if idx < MAX_DENSE_CELLS {
      self.cells.resize(idx + 1, 0);
      self.cells[idx] = value;
    } else {
      // Sparse addresses are all at or above `MAX_DENSE_CELLS`, which contiguous growth never
      // reaches, so the two never overlap.
      self.sparse.insert(idx, value);
    }
  }
}
