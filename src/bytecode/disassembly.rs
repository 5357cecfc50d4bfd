/*!
  The human readable form of an instruction is its mnemonic followed by its raw operands, each
  prefixed to show how the operand is resolved:

    ```text
    $n  positional: the cell at address n
    @n  relative:   the cell at address n + relative base
     n  immediate:  the value n itself
    ```

  Disassembly is purely diagnostic. It reads memory but never resolves operands.
*/

use crate::bytecode::{AddressingMode, InstructionWord};
use crate::error::DecodeError;
use crate::Value;

fn leader(mode: AddressingMode) -> &'static str {
  match mode {
    AddressingMode::Positional => "$",
    AddressingMode::Relative   => "@",
    AddressingMode::Immediate  => ""
  }
}

/// Renders the instruction at `ip` as `"   ip: mnemonic op, op, ..."`.
pub fn disassemble(cells: &[Value], ip: usize) -> Result<String, DecodeError> {
  render(cells, ip).map(|(text, _width)| text)
}

/// Renders the instruction at `ip` along with the number of cells it occupies.
fn render(cells: &[Value], ip: usize) -> Result<(String, usize), DecodeError> {
  let word    = cells.get(ip).copied().unwrap_or(0);
  let decoded = InstructionWord::decode(word, ip)?;

  let operands =
    decoded.modes
           .iter()
           .take(decoded.opcode.arity())
           .enumerate()
           .map(|(idx, mode)| {
             let raw = cells.get(ip + idx + 1).copied().unwrap_or(0);
             format!("{}{}", leader(*mode), raw)
           })
           .collect::<Vec<String>>()
           .join(", ");

  let text = format!("{:5}: {} {}", ip, decoded.opcode, operands);
  Ok((text.trim_end().to_string(), decoded.opcode.width()))
}

/**
  Disassembles a whole program front to back. Cells that do not decode as an instruction,
  usually data embedded in the program, are listed as `.data` one cell at a time.
*/
pub fn listing(program: &[Value]) -> Vec<String> {
  let mut lines = Vec::new();
  let mut ip = 0;

  while ip < program.len() {
    match render(program, ip) {
      Ok((line, width)) => {
        lines.push(line);
        ip += width;
      }
      Err(_e) => {
        lines.push(format!("{:5}: .data {}", ip, program[ip]));
        ip += 1;
      }
    }
  }

  lines
}
