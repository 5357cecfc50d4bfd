/*!
  Strategies for the two ends of a machine's I/O that live outside the VM.

  The input queue is the only input a machine needs. An `InputPrompt` is an opt-in fallback a
  standalone machine consults when an `in` instruction finds the queue empty, for running a
  program by hand. An `OutputSink` receives every value a standalone machine emits. Chained
  machines use neither: their input comes only from the queue and their outputs are returned
  to the caller one at a time.
*/

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::error::VmError;
use crate::Value;

/// Supplies input values on demand when the input queue runs dry.
pub trait InputPrompt {
  fn read_value(&mut self) -> Result<Value, VmError>;
}

/// Receives values emitted by `out` instructions.
pub trait OutputSink {
  fn emit(&mut self, value: Value) -> Result<(), VmError>;
}

/**
  Prompts for input on a writer and reads one integer per line from a reader. Blank lines are
  skipped, and end of input is an error, since nothing more will ever arrive.
*/
pub struct LinePrompt<R, W> {
  reader : R,
  writer : W,
  prompt : String
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
  pub fn new(reader: R, writer: W) -> Self {
    LinePrompt {
      reader,
      writer,
      prompt: "$ ".to_string()
    }
  }

  pub fn with_prompt(mut self, prompt: &str) -> Self {
    self.prompt = prompt.to_string();
    self
  }
}

/// A `LinePrompt` on the process's standard input and output.
pub fn stdin_prompt() -> LinePrompt<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
  LinePrompt::new(std::io::BufReader::new(std::io::stdin()), std::io::stdout())
}

impl<R: BufRead, W: Write> InputPrompt for LinePrompt<R, W> {
  fn read_value(&mut self) -> Result<Value, VmError> {
    let mut line = String::new();
    loop {
      write!(self.writer, "{}", self.prompt)?;
      self.writer.flush()?;

      line.clear();
      if self.reader.read_line(&mut line)? == 0 {
        return Err(VmError::InvalidInput("end of input".to_string()));
      }

      let text = line.trim();
      if text.is_empty() {
        continue;
      }
      return text.parse::<Value>()
                 .map_err(|_e| VmError::InvalidInput(text.to_string()));
    } // end loop
  }
}

/// Writes each value on its own line.
pub struct WriterSink<W> {
  writer: W
}

impl<W: Write> WriterSink<W> {
  pub fn new(writer: W) -> Self {
    WriterSink { writer }
  }
}

pub fn stdout_sink() -> WriterSink<std::io::Stdout> {
  WriterSink::new(std::io::stdout())
}

impl<W: Write> OutputSink for WriterSink<W> {
  fn emit(&mut self, value: Value) -> Result<(), VmError> {
    writeln!(self.writer, "{}", value)?;
    Ok(())
  }
}

/// A sink the caller keeps a handle to, so the values can be inspected after the run.
pub type SharedOutputs = Rc<RefCell<Vec<Value>>>;

impl OutputSink for SharedOutputs {
  fn emit(&mut self, value: Value) -> Result<(), VmError> {
    self.borrow_mut().push(value);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn prompt_reads_one_value_per_call(){
    let mut shown = Vec::new();
    {
      let mut prompt = LinePrompt::new(Cursor::new("12\n\n  -7 \n"), &mut shown);
      assert_eq!(prompt.read_value().unwrap(), 12);
      assert_eq!(prompt.read_value().unwrap(), -7);
      assert!(matches!(prompt.read_value(), Err(VmError::InvalidInput(_))));
    }
    assert!(String::from_utf8(shown).unwrap().starts_with("$ $ "));
  }

  #[test]
  fn prompt_rejects_non_integers(){
    let mut prompt = LinePrompt::new(Cursor::new("seven\n"), Vec::new()).with_prompt("> ");
    match prompt.read_value() {
      Err(VmError::InvalidInput(text)) => assert_eq!(text, "seven"),
      other => panic!("expected InvalidInput, got {:?}", other)
    }
  }

  #[test]
  fn writer_sink_writes_lines(){
    let mut buffer = Vec::new();
    {
      let mut sink = WriterSink::new(&mut buffer);
      sink.emit(1).unwrap();
      sink.emit(-20).unwrap();
    }
    assert_eq!(String::from_utf8(buffer).unwrap(), "1\n-20\n");
  }

  #[test]
  fn shared_outputs_collect(){
    let outputs = SharedOutputs::default();
    let mut sink = outputs.clone();
    sink.emit(3).unwrap();
    sink.emit(4).unwrap();
    assert_eq!(*outputs.borrow(), vec![3, 4]);
  }
}
