/*!

  An Intcode virtual machine.

  Programs are flat lists of integers loaded onto a growable tape. The machine decodes one
  instruction word at a time, resolves its parameters in positional, immediate, or relative
  mode, and dispatches on a closed set of ten opcodes.

  A machine runs in one of two modes, fixed when it is built:

   * `ExecutionMode::Standalone` runs to `halt` and returns the last value emitted.
   * `ExecutionMode::Chained` stops after every `out`, so that several machines can be wired
     together by forwarding one machine's outputs into another's input queue.

  ```
  use intcode::{ExecutionMode, Intcode, Outcome, Program};

  let program: Program = "3,0,4,0,99".parse().unwrap();
  let mut vm = Intcode::new(program, ExecutionMode::Standalone);
  vm.add_input(42);
  assert_eq!(vm.execute().unwrap(), Outcome::Halted(Some(42)));
  ```

*/

mod address;
pub mod bytecode;
mod error;
pub mod io;
pub mod pipeline;
mod program;
mod tape;
mod vm;

/// The contents of every tape cell, operand, and I/O value.
pub type Value = i64;

pub use address::Address;
pub use error::{DecodeError, VmError};
pub use program::Program;
pub use tape::Tape;
pub use vm::{Decoded, ExecutionMode, Intcode, Outcome};
