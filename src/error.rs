//! Error types for decoding, executing, and loading Intcode programs. Every error is fatal to
//! the VM instance that raised it; the machine never retries or recovers on its own.

use thiserror::Error;

use crate::bytecode::Opcode;
use crate::Value;

/// Reasons an instruction word could not be decoded.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum DecodeError {
  #[error("unknown opcode in instruction word {word} at address {ip}")]
  UnknownOpcode { ip: usize, word: Value },

  #[error("unknown addressing mode {digit} for parameter {parameter} of word {word} at address {ip}")]
  UnknownMode {
    ip        : usize,
    word      : Value,
    parameter : usize,
    digit     : Value
  },

  #[error("parameter {parameter} of word {word} at address {ip} is written to but is in immediate mode")]
  ImmediateWrite {
    ip        : usize,
    word      : Value,
    parameter : usize
  },
}

#[derive(Debug, Error)]
pub enum VmError {
  #[error(transparent)]
  Decode(#[from] DecodeError),

  /// The instruction pointer left the program region without executing `halt`.
  #[error("reached end of program at address {ip} without finding a halt instruction")]
  MalformedProgram { ip: usize },

  /// An `in` instruction ran with an empty input queue and no prompt to fall back on.
  #[error("input instruction at address {ip} found the input queue empty")]
  InputExhausted { ip: usize },

  #[error("address {address} is out of range")]
  AddressOutOfRange { address: Value },

  #[error("arithmetic overflow in {opcode} at address {ip}")]
  Overflow { ip: usize, opcode: Opcode },

  /// A chain of machines finished without the final machine emitting anything.
  #[error("the final machine of the chain produced no output")]
  NoOutput,

  #[error("syntax error in program text at line {line}, column {column}: found {found:?}")]
  Parse {
    line   : usize,
    column : usize,
    found  : String
  },

  #[error("invalid input value: {0:?}")]
  InvalidInput(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
