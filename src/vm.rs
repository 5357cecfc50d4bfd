//! Structures and functions for the Intcode virtual machine: the fetch-decode-dispatch loop,
//! the input queue, and the two execution disciplines.

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use prettytable::{cell, format as TableFormat, row, table, Table};
use tracing::debug;
#[cfg(feature = "trace_computation")]
use tracing::trace;

use crate::address::Address;
use crate::bytecode::{disassemble, AddressingMode, InstructionWord, Opcode, ParameterRole,
                      MAX_PARAMETERS};
use crate::error::VmError;
use crate::io::{InputPrompt, OutputSink};
use crate::program::Program;
use crate::tape::Tape;
use crate::Value;

/// Number of tape cells shown on either side of the instruction pointer by `Display`.
const TAPE_WINDOW: usize = 8;

/// How a machine behaves when it emits a value. Fixed at construction.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ExecutionMode {
  /// Run until `halt`, returning the last value emitted.
  Standalone,
  /// Suspend after every `out`, so the caller can forward the value to another machine.
  Chained
}

/// What a call to `Intcode::execute` stopped on.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Outcome {
  /// A chained machine emitted a value and is ready to be resumed.
  Output(Value),
  /// The machine executed `halt`. Carries the last value emitted, if any ever was.
  Halted(Option<Value>)
}

/// An instruction with its parameters resolved: read parameters hold values, and write
/// parameters hold the address to write to.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Decoded {
  pub opcode   : Opcode,
  pub operands : [Value; MAX_PARAMETERS]
}

impl Decoded {
  fn value(&self, idx: usize) -> Value {
    self.operands[idx]
  }

  fn address(&self, idx: usize) -> Result<Address, VmError> {
    Address::try_from(self.operands[idx])
  }
}

/// The result of executing a single instruction.
enum Step {
  Continue,
  Output(Value),
  Halt
}

pub struct Intcode {
  program       : Program,
  mode          : ExecutionMode,

  // Memory and registers
  tape          : Tape,
  ip            : usize,
  relative_base : Value,

  // I/O
  inputs        : VecDeque<Value>,
  last_input    : Option<Value>,
  last_output   : Option<Value>,
  prompt        : Option<Box<dyn InputPrompt>>,
  sink          : Option<Box<dyn OutputSink>>,
}

impl Intcode {

  // region Construction and state

  pub fn new(program: Program, mode: ExecutionMode) -> Intcode {
    Intcode {
      tape          :  Tape::new(program.words()),
      program,
      mode,
      ip            :  0,
      relative_base :  0,
      inputs        :  VecDeque::new(),
      last_input    :  None,
      last_output   :  None,
      prompt        :  None,
      sink          :  None,
    }
  }

  /**
    Installs a prompt a standalone machine falls back on when its input queue is empty. Chained
    machines never consult it.
  */
  pub fn with_input_prompt(mut self, prompt: impl InputPrompt + 'static) -> Intcode {
    self.prompt = Some(Box::new(prompt));
    self
  }

  /// Installs a sink that receives every value a standalone machine emits.
  pub fn with_output_sink(mut self, sink: impl OutputSink + 'static) -> Intcode {
    self.sink = Some(Box::new(sink));
    self
  }

  pub fn add_input(&mut self, value: Value) {
    self.inputs.push_back(value);
  }

  pub fn add_inputs<I>(&mut self, values: I)
    where I: IntoIterator<Item = Value>
  {
    self.inputs.extend(values);
  }

  /**
    Restores the tape, instruction pointer, and relative base to their state right after
    construction, and forgets the last input and output. Queued inputs are kept.
  */
  pub fn reset(&mut self) {
    self.tape.reload(self.program.words());
    self.ip            = 0;
    self.relative_base = 0;
    self.last_input    = None;
    self.last_output   = None;
    debug!(pending_inputs = self.inputs.len(), "reset");
  }

  /// Sets the two cells after the first instruction word, the "noun" and the "verb".
  pub fn set_noun_and_verb(&mut self, noun: Value, verb: Value) {
    self.tape.write(Address::from_idx(1), noun);
    self.tape.write(Address::from_idx(2), verb);
  }

  pub fn mode(&self) -> ExecutionMode {
    self.mode
  }

  pub fn program(&self) -> &Program {
    &self.program
  }

  pub fn tape(&self) -> &Tape {
    &self.tape
  }

  pub fn ip(&self) -> usize {
    self.ip
  }

  pub fn relative_base(&self) -> Value {
    self.relative_base
  }

  pub fn last_input(&self) -> Option<Value> {
    self.last_input
  }

  pub fn last_output(&self) -> Option<Value> {
    self.last_output
  }

  pub fn pending_inputs(&self) -> &VecDeque<Value> {
    &self.inputs
  }

  /// Renders the instruction at the instruction pointer.
  pub fn disassemble(&self) -> Result<String, VmError> {
    Ok(disassemble(self.tape.cells(), self.ip)?)
  }

  // endregion

  // region Decoding

  /// Reads the parameter cell `idx` places after the instruction word.
  fn raw_parameter(&self, idx: usize) -> Value {
    self.tape.read(Address::from_idx(self.ip) + (idx + 1))
  }

  /// Resolves the instruction at the instruction pointer against memory.
  pub fn decode(&self) -> Result<Decoded, VmError> {
    let word    = self.tape.read(Address::from_idx(self.ip));
    let decoded = InstructionWord::decode(word, self.ip)?;

    let mut operands = [0; MAX_PARAMETERS];
    for (idx, role) in decoded.opcode.roles().iter().enumerate() {
      let raw = self.raw_parameter(idx);

      operands[idx] =
        match (role, decoded.modes[idx]) {
          (ParameterRole::Write, AddressingMode::Relative) => self.offset(raw)?,
          // Immediate writes were rejected by `InstructionWord::decode`.
          (ParameterRole::Write, _)                         => raw,

          (ParameterRole::Read, AddressingMode::Positional) => {
            self.tape.read(Address::try_from(raw)?)
          }
          (ParameterRole::Read, AddressingMode::Immediate)  => raw,
          (ParameterRole::Read, AddressingMode::Relative)   => {
            self.tape.read(Address::try_from(self.offset(raw)?)?)
          }
        };
    } // end for

    Ok(Decoded { opcode: decoded.opcode, operands })
  }

  fn offset(&self, raw: Value) -> Result<Value, VmError> {
    raw.checked_add(self.relative_base)
       .ok_or(VmError::AddressOutOfRange { address: raw })
  }

  // endregion

  // region Execution

  /**
    Runs the machine according to its mode.

    A standalone machine runs until `halt` and returns `Outcome::Halted` with the last value it
    emitted. A chained machine runs until the next `out` or `halt`, whichever comes first. After
    an `out` it returns `Outcome::Output` with the instruction pointer already past the
    instruction, so the next call resumes exactly where this one stopped. A halted machine stays
    halted: calling `execute` again returns `Outcome::Halted` without running anything.
  */
  pub fn execute(&mut self) -> Result<Outcome, VmError> {
    while self.ip < self.program.len() {
      match self.step()? {

        Step::Continue      => {}

        Step::Output(value) => {
          match self.mode {
            ExecutionMode::Chained    => {
              debug!(ip = self.ip, value, "suspending on output");
              return Ok(Outcome::Output(value));
            }
            ExecutionMode::Standalone => {
              if let Some(sink) = self.sink.as_mut() {
                sink.emit(value)?;
              }
            }
          }
        }

        Step::Halt          => {
          debug!(ip = self.ip, last_output = ?self.last_output, "halted");
          return Ok(Outcome::Halted(self.last_output));
        }

      } // end match on step
    } // end while

    Err(VmError::MalformedProgram { ip: self.ip })
  }

  /// Executes the instruction at the instruction pointer.
  fn step(&mut self) -> Result<Step, VmError> {
    #[cfg(feature = "trace_computation")]
    trace!(relative_base = self.relative_base, "{}", self.disassemble()?);

    let decoded = self.decode()?;
    let opcode  = decoded.opcode;
    let next_ip = self.ip + opcode.width();

    match opcode {

      Opcode::Add => {
        let sum = decoded.value(0)
                         .checked_add(decoded.value(1))
                         .ok_or(VmError::Overflow { ip: self.ip, opcode })?;
        self.tape.write(decoded.address(2)?, sum);
      }

      Opcode::Multiply => {
        let product = decoded.value(0)
                             .checked_mul(decoded.value(1))
                             .ok_or(VmError::Overflow { ip: self.ip, opcode })?;
        self.tape.write(decoded.address(2)?, product);
      }

      Opcode::Input => {
        let address = decoded.address(0)?;
        let value   = self.next_input()?;
        self.tape.write(address, value);
        self.last_input = Some(value);
      }

      Opcode::Output => {
        self.last_output = Some(decoded.value(0));
        self.ip = next_ip;
        return Ok(Step::Output(decoded.value(0)));
      }

      Opcode::JumpIfTrue => {
        self.ip =
          match decoded.value(0) != 0 {
            true  => Address::try_from(decoded.value(1))?.idx(),
            false => next_ip
          };
        return Ok(Step::Continue);
      }

      Opcode::JumpIfFalse => {
        self.ip =
          match decoded.value(0) == 0 {
            true  => Address::try_from(decoded.value(1))?.idx(),
            false => next_ip
          };
        return Ok(Step::Continue);
      }

      Opcode::LessThan => {
        let flag = (decoded.value(0) < decoded.value(1)) as Value;
        self.tape.write(decoded.address(2)?, flag);
      }

      Opcode::Equals => {
        let flag = (decoded.value(0) == decoded.value(1)) as Value;
        self.tape.write(decoded.address(2)?, flag);
      }

      Opcode::AdjustRelativeBase => {
        self.relative_base =
          self.relative_base
              .checked_add(decoded.value(0))
              .ok_or(VmError::Overflow { ip: self.ip, opcode })?;
      }

      Opcode::Halt => {
        return Ok(Step::Halt);
      }

    } // end match on opcode

    self.ip = next_ip;
    Ok(Step::Continue)
  }

  /**
    Takes the next value from the input queue. Only a standalone machine with an installed
    prompt has anywhere else to look.
  */
  fn next_input(&mut self) -> Result<Value, VmError> {
    if let Some(value) = self.inputs.pop_front() {
      return Ok(value);
    }

    match (self.mode, self.prompt.as_mut()) {
      (ExecutionMode::Standalone, Some(prompt)) => {
        debug!(ip = self.ip, "input queue empty, prompting");
        prompt.read_value()
      }
      _ => Err(VmError::InputExhausted { ip: self.ip })
    }
  }

  // endregion

  // region Display methods

  fn make_register_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    let optional = |value: Option<Value>| {
      value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    };
    let pending = self.inputs
                      .iter()
                      .map(Value::to_string)
                      .collect::<Vec<String>>()
                      .join(", ");

    table.add_row(row![r->"mode =",          format!("{:?}", self.mode)]);
    table.add_row(row![r->"ip =",            self.ip]);
    table.add_row(row![r->"relative base =", self.relative_base]);
    table.add_row(row![r->"last input =",    optional(self.last_input)]);
    table.add_row(row![r->"last output =",   optional(self.last_output)]);
    table.add_row(row![r->"inputs =",        format!("[{}]", pending)]);
    table
  }

  fn make_tape_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    let end   = std::cmp::min(self.ip + TAPE_WINDOW + 1, self.tape.len());
    let start = std::cmp::min(self.ip.saturating_sub(TAPE_WINDOW), end);

    for (i, cell) in self.tape.cells()[start..end].iter().enumerate() {
      match i + start == self.ip {

        true  => {
          table.add_row(row![r->format!("* --> T[{}] =", i + start), cell]);
        }

        false => {
          table.add_row(row![r->format!("T[{}] =", i + start), cell]);
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Intcode {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let register_table = self.make_register_table();
    let tape_table     = self.make_tape_table();

    let mut combined_table = table!([register_table, tape_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Tape"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let instruction = self.disassemble().unwrap_or_else(|e| format!("{:5}: <{}>", self.ip, e));

    write!(f, "{}\n{}", instruction, combined_table)
  }
}
