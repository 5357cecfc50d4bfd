/*!

  Programs are flat sequences of signed integers. An instruction is a single instruction word
  followed by zero to three parameter cells. There is no separate code segment: instructions and
  data share the tape, and a program is free to overwrite its own instructions.

  The instruction set is small and closed, so opcodes are a fieldless enum matched exhaustively
  by the VM rather than a table of handlers. The enum discriminants are the numeric opcodes
  themselves, so `num_enum` gives the conversion from a word's low digits for free.

*/

mod disassembly;
mod instruction;

pub use disassembly::{disassemble, listing};
pub use instruction::{AddressingMode, InstructionWord, Opcode, ParameterRole, MAX_PARAMETERS};
