//! Command line front end: run a program, list its instructions, or chain copies of it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use intcode::bytecode::listing;
use intcode::io::{stdin_prompt, stdout_sink};
use intcode::pipeline::run_chain;
use intcode::{ExecutionMode, Intcode, Outcome, Program, Value};

#[derive(Parser, Debug)]
#[command(name = "intcode", version, about = "Runs Intcode programs")]
struct Cli {
  /// Log every executed instruction. Overrides `RUST_LOG`.
  #[arg(long, global = true)]
  trace: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run a program to completion, printing every value it outputs.
  Run {
    /// Program file: comma separated integers, possibly over several lines.
    file: PathBuf,

    /// Values to queue as input, in order.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    input: Vec<Value>,

    /// Value to store at address 1 before running.
    #[arg(long, requires = "verb", allow_hyphen_values = true)]
    noun: Option<Value>,

    /// Value to store at address 2 before running.
    #[arg(long, requires = "noun", allow_hyphen_values = true)]
    verb: Option<Value>,

    /// Prompt on the terminal when the program wants more input than was queued.
    #[arg(long)]
    interactive: bool,

    /// Print only the final result, not every output.
    #[arg(short, long)]
    quiet: bool,

    /// Print the machine state after the program halts.
    #[arg(long)]
    dump: bool,
  },

  /// Print a linear disassembly of a program.
  Disasm {
    file: PathBuf,
  },

  /// Run one chained copy of a program per phase setting, passing a signal along the chain.
  Chain {
    file: PathBuf,

    /// Phase settings, one per machine.
    #[arg(short, long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    phases: Vec<Value>,

    /// Feed the last machine's output back into the first until a machine halts.
    #[arg(long)]
    feedback: bool,
  },
}

fn init_logging(trace: bool) {
  let env_filter = match trace {
    true  => EnvFilter::new("trace"),
    false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
  };

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn load(file: &Path) -> anyhow::Result<Program> {
  Program::from_file(file).with_context(|| format!("failed to load {}", file.display()))
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_logging(cli.trace);

  match cli.command {

    Command::Run { file, input, noun, verb, interactive, quiet, dump } => {
      let program = load(&file)?;
      let mut vm  = Intcode::new(program, ExecutionMode::Standalone);
      if !quiet {
        vm = vm.with_output_sink(stdout_sink());
      }
      if interactive {
        vm = vm.with_input_prompt(stdin_prompt());
      }
      vm.add_inputs(input);
      if let (Some(noun), Some(verb)) = (noun, verb) {
        vm.set_noun_and_verb(noun, verb);
      }

      let outcome = vm.execute();
      if dump {
        println!("{}", vm);
      }

      match outcome.context("program failed")? {
        Outcome::Halted(Some(value)) if quiet => println!("{}", value),
        Outcome::Halted(last_output)          => {
          info!(?last_output, "halted");
        }
        Outcome::Output(_)                    => unreachable!("standalone machines never suspend"),
      }
      if noun.is_some() {
        println!("address 0 = {}", vm.tape().cells()[0]);
      }
    }

    Command::Disasm { file } => {
      let program = load(&file)?;
      for line in listing(program.words()) {
        println!("{}", line);
      }
    }

    Command::Chain { file, phases, feedback } => {
      let program = load(&file)?;
      let result  = run_chain(&program, &phases, feedback).context("chain failed")?;
      println!("{}", result);
    }

  } // end match on command

  Ok(())
}
