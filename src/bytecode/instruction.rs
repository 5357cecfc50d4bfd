/*!

  Instruction words are plain decimal integers. The two lowest decimal digits select the
  operation, and each higher digit gives the addressing mode of one parameter, starting with
  the hundreds digit for the first parameter:

    ```text
    ABCDE
     1002
    DE - two-digit opcode        (02 == mul)
     C - mode of 1st parameter   ( 0 == positional)
     B - mode of 2nd parameter   ( 1 == immediate)
     A - mode of 3rd parameter   ( 0 == positional, omitted as a leading zero)
    ```

  The parameters themselves occupy the cells following the instruction word. This module only
  takes a word apart. Resolving parameters against memory is the VM's job.

*/

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::error::DecodeError;
use crate::Value;

/// No instruction takes more parameters than this.
pub const MAX_PARAMETERS: usize = 3;

/**
  Opcodes of the virtual machine. The discriminants are the numeric opcodes as they appear in
  the low two digits of an instruction word, and the strum serializations are the mnemonics
  used by the disassembler.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u8)]
pub enum Opcode {
  #[strum(serialize = "add")]  Add                = 1,  // add( read, read, write )
  #[strum(serialize = "mul")]  Multiply           = 2,  // mul( read, read, write )
  #[strum(serialize = "in")]   Input              = 3,  // in( write )
  #[strum(serialize = "out")]  Output             = 4,  // out( read )
  #[strum(serialize = "jnz")]  JumpIfTrue         = 5,  // jnz( read, read )
  #[strum(serialize = "jz")]   JumpIfFalse        = 6,  // jz( read, read )
  #[strum(serialize = "lt")]   LessThan           = 7,  // lt( read, read, write )
  #[strum(serialize = "eq")]   Equals             = 8,  // eq( read, read, write )
  #[strum(serialize = "rbo")]  AdjustRelativeBase = 9,  // rbo( read )
  #[strum(serialize = "halt")] Halt               = 99, // halt
}

/// Whether a parameter is read as a value or names the address an instruction writes to.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ParameterRole {
  Read,
  Write
}

#[derive(
  StrumDisplay, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,             Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum AddressingMode {
  #[strum(serialize = "positional")] Positional = 0,
  #[strum(serialize = "immediate")]  Immediate  = 1,
  #[strum(serialize = "relative")]   Relative   = 2,
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    (*self).into()
  }

  /// The roles of this opcode's parameters, in order.
  pub fn roles(&self) -> &'static [ParameterRole] {
    use ParameterRole::{Read, Write};

    match self {
      | Opcode::Add
      | Opcode::Multiply
      | Opcode::LessThan
      | Opcode::Equals             => &[Read, Read, Write],

      | Opcode::JumpIfTrue
      | Opcode::JumpIfFalse        => &[Read, Read],

      | Opcode::Output
      | Opcode::AdjustRelativeBase => &[Read],

      Opcode::Input                => &[Write],

      Opcode::Halt                 => &[],
    }
  }

  pub fn arity(&self) -> usize {
    self.roles().len()
  }

  /// The number of cells an instruction with this opcode occupies, including the word itself.
  pub fn width(&self) -> usize {
    1 + self.arity()
  }
}

/**
  An instruction word taken apart into its opcode and the addressing mode of each parameter.
  Modes past the opcode's arity are always `Positional` and carry no meaning.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct InstructionWord {
  pub opcode : Opcode,
  pub modes  : [AddressingMode; MAX_PARAMETERS]
}

impl InstructionWord {

  /**
    Splits `word`, found at address `ip`, into its opcode and parameter modes. Fails on unknown
    opcodes, unknown mode digits, and write parameters in immediate mode.

    Negative words are rejected as `UnknownOpcode`. They are not reduced with a floored modulo,
    under which `-99` would read as opcode 1 (`add`) and `-1` as `halt`.
  */
  pub fn decode(word: Value, ip: usize) -> Result<InstructionWord, DecodeError> {
    if word < 0 {
      return Err(DecodeError::UnknownOpcode { ip, word });
    }

    let opcode =
      match Opcode::try_from((word % 100) as u8) {
        Ok(opcode) => opcode,
        Err(_e)    => return Err(DecodeError::UnknownOpcode { ip, word })
      };

    let mut modes = [AddressingMode::Positional; MAX_PARAMETERS];
    let mut mask: Value = 10;
    for (idx, role) in opcode.roles().iter().enumerate() {
      mask *= 10;
      let digit = (word / mask) % 10;
      let mode =
        match AddressingMode::try_from(digit as u8) {
          Ok(mode) => mode,
          Err(_e)  => {
            return Err(DecodeError::UnknownMode { ip, word, parameter: idx + 1, digit });
          }
        };

      if *role == ParameterRole::Write && mode == AddressingMode::Immediate {
        return Err(DecodeError::ImmediateWrite { ip, word, parameter: idx + 1 });
      }
      modes[idx] = mode;
    } // end for

    Ok(InstructionWord { opcode, modes })
  }

  /// The inverse of `decode`. Useful for building programs by hand.
  pub fn encode(&self) -> Value {
    let mut word = self.opcode.code() as Value;
    let mut mask: Value = 10;
    for mode in self.modes.iter().take(self.opcode.arity()) {
      mask *= 10;
      word += Into::<u8>::into(*mode) as Value * mask;
    }
    word
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;
  use rstest::rstest;

  use AddressingMode::{Immediate, Positional, Relative};

  #[rstest]
  #[case(1,     Opcode::Add,                [Positional, Positional, Positional])]
  #[case(1002,  Opcode::Multiply,           [Positional, Immediate,  Positional])]
  #[case(1101,  Opcode::Add,                [Immediate,  Immediate,  Positional])]
  #[case(203,   Opcode::Input,              [Relative,   Positional, Positional])]
  #[case(104,   Opcode::Output,             [Immediate,  Positional, Positional])]
  #[case(1205,  Opcode::JumpIfTrue,         [Relative,   Immediate,  Positional])]
  #[case(21107, Opcode::LessThan,           [Immediate,  Immediate,  Relative  ])]
  #[case(209,   Opcode::AdjustRelativeBase, [Relative,   Positional, Positional])]
  #[case(99,    Opcode::Halt,               [Positional, Positional, Positional])]
  fn decodes(
    #[case] word: Value,
    #[case] opcode: Opcode,
    #[case] modes: [AddressingMode; MAX_PARAMETERS]
  ){
    let decoded = InstructionWord::decode(word, 0).unwrap();
    assert_eq!(decoded, InstructionWord { opcode, modes });
    assert_eq!(decoded.encode(), word);
  }

  #[rstest]
  #[case(0)]
  #[case(10)]
  #[case(98)]
  #[case(-1)]
  #[case(-99)]
  fn unknown_opcodes(#[case] word: Value){
    assert_eq!(
      InstructionWord::decode(word, 7),
      Err(DecodeError::UnknownOpcode { ip: 7, word })
    );
  }

  #[test]
  fn unknown_mode_digit(){
    assert_eq!(
      InstructionWord::decode(3101, 0),
      Err(DecodeError::UnknownMode { ip: 0, word: 3101, parameter: 2, digit: 3 })
    );
  }

  #[test]
  fn digits_past_the_arity_are_ignored(){
    // `out` has one parameter, so the thousands digit is never looked at.
    assert_eq!(InstructionWord::decode(5104, 0).unwrap().opcode, Opcode::Output);
  }

  #[test]
  fn immediate_write_is_rejected(){
    assert_eq!(
      InstructionWord::decode(11101, 4),
      Err(DecodeError::ImmediateWrite { ip: 4, word: 11101, parameter: 3 })
    );
    assert_eq!(
      InstructionWord::decode(103, 0),
      Err(DecodeError::ImmediateWrite { ip: 0, word: 103, parameter: 1 })
    );
  }

  #[test]
  fn mnemonics(){
    assert_eq!(Opcode::AdjustRelativeBase.mnemonic(), "rbo");
    assert_eq!(format!("{}", Opcode::JumpIfFalse), "jz");
    assert_eq!(Opcode::from_str("eq").unwrap(), Opcode::Equals);
    assert!(Opcode::from_str("nop").is_err());
  }

  #[test]
  fn widths(){
    assert_eq!(Opcode::Add.width(), 4);
    assert_eq!(Opcode::JumpIfFalse.width(), 3);
    assert_eq!(Opcode::Input.width(), 2);
    assert_eq!(Opcode::Halt.width(), 1);
  }
}
