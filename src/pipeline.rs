//! Wiring chained machines together. Nothing here reaches inside a machine: a chain is just a
//! row of `Intcode` instances and a loop forwarding each one's outputs into the next one's input
//! queue.

use tracing::{debug, info};

use crate::error::VmError;
use crate::program::Program;
use crate::vm::{ExecutionMode, Intcode, Outcome};
use crate::Value;

/// The value fed into the first machine of a chain to start it.
pub const INITIAL_SIGNAL: Value = 0;

/**
  Runs one chained copy of `program` per entry of `phases`, in order. Each machine first reads its
  phase setting, then the signal handed along the chain, starting from `INITIAL_SIGNAL`.

  Without `feedback`, the signal passes through the chain once. With `feedback`, the last
  machine's output is fed back into the first machine, and the loop continues until some
  machine halts.

  Returns the last value the final machine emitted, or `VmError::NoOutput` if it never emitted
  one. An empty `phases` is a chain with no final machine, so it fails the same way.
*/
pub fn run_chain(program: &Program, phases: &[Value], feedback: bool) -> Result<Value, VmError> {
  if phases.is_empty() {
    return Err(VmError::NoOutput);
  }

  let mut machines: Vec<Intcode> =
    phases.iter()
          .map(|phase| {
            let mut machine = Intcode::new(program.clone(), ExecutionMode::Chained);
            machine.add_input(*phase);
            machine
          })
          .collect();

  let mut signal         = INITIAL_SIGNAL;
  let mut last_from_tail = None;
  let mut round: usize   = 0;

  'rounds: loop {
    round += 1;
    for (idx, machine) in machines.iter_mut().enumerate() {
      machine.add_input(signal);
      match machine.execute()? {

        Outcome::Output(value) => {
          signal = value;
        }

        Outcome::Halted(_)     => {
          debug!(round, machine = idx, "machine halted, chain finished");
          break 'rounds;
        }

      } // end match on outcome
    } // end for

    last_from_tail = Some(signal);
    if !feedback {
      break;
    }
  } // end loop

  let result = last_from_tail.ok_or(VmError::NoOutput)?;
  info!(?phases, feedback, rounds = round, result, "chain complete");
  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  fn program(words: &[Value]) -> Program {
    Program::new(words.to_vec())
  }

  #[rstest]
  #[case(
    &[3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0],
    &[4,3,2,1,0],
    43210
  )]
  #[case(
    &[3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0],
    &[0,1,2,3,4],
    54321
  )]
  #[case(
    &[3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,1002,33,7,33,1,33,31,31,1,32,31,31,4,31,
      99,0,0,0],
    &[1,0,4,3,2],
    65210
  )]
  fn serial_chain(#[case] words: &[Value], #[case] phases: &[Value], #[case] expected: Value){
    assert_eq!(run_chain(&program(words), phases, false).unwrap(), expected);
  }

  #[rstest]
  #[case(
    &[3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5],
    &[9,8,7,6,5],
    139629729
  )]
  #[case(
    &[3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,1001,54,-5,54,1105,1,12,1,53,
      54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10],
    &[9,7,8,5,6],
    18216
  )]
  fn feedback_loop(#[case] words: &[Value], #[case] phases: &[Value], #[case] expected: Value){
    assert_eq!(run_chain(&program(words), phases, true).unwrap(), expected);
  }

  #[test]
  fn chain_that_never_outputs(){
    let result = run_chain(&program(&[3, 0, 3, 0, 99]), &[1, 2], false);
    assert!(matches!(result, Err(VmError::NoOutput)));
  }

  #[rstest]
  #[case(false)]
  #[case(true)]
  fn empty_chain_has_no_output(#[case] feedback: bool){
    let result = run_chain(&program(&[104, 5, 99]), &[], feedback);
    assert!(matches!(result, Err(VmError::NoOutput)));
  }

  #[test]
  fn errors_stop_the_chain(){
    // The first machine reads its phase and the signal, then asks for a third input.
    let result = run_chain(&program(&[3, 0, 3, 0, 3, 0, 99]), &[1], false);
    assert!(matches!(result, Err(VmError::InputExhausted { ip: 4 })));
  }
}
