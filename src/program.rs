/*!

Loads programs from text. A program is a list of decimal integers separated by commas, which
may be spread over several lines:

```text
<program>    ::=  <ws>* ( <value> ( <separator> <value> )* )? <ws>*
<separator>  ::=  <space>* ( ',' | <newline> ) <ws>*
<value>      ::=  ( '-' | '+' )? <digit>+
```

A line break between two values separates them just as a comma does, so a program split over
several lines reads as the lines concatenated.

*/

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{
    char as one_char,
    digit1,
    line_ending,
    multispace0,
    space0
  },
  combinator::{all_consuming, map_res, opt, recognize},
  multi::separated_list,
  sequence::{delimited, pair, tuple},
  Err as NomErr,
  IResult
};
use tracing::debug;

use crate::error::VmError;
use crate::Value;

/// An immutable program image. Machines copy it onto their tape and reload it on reset.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Program {
  words: Vec<Value>
}

impl Program {
  pub fn new(words: Vec<Value>) -> Program {
    Program { words }
  }

  pub fn words(&self) -> &[Value] {
    &self.words
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Program, VmError> {
    let text    = std::fs::read_to_string(path.as_ref())?;
    let program = text.parse::<Program>()?;
    debug!(path = %path.as_ref().display(), words = program.len(), "loaded program");
    Ok(program)
  }
}

impl From<Vec<Value>> for Program {
  fn from(words: Vec<Value>) -> Self {
    Program::new(words)
  }
}

impl Display for Program {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      self.words
          .iter()
          .map(Value::to_string)
          .collect::<Vec<String>>()
          .join(",")
    )
  }
}

// region Parsers

fn value(input: &str) -> IResult<&str, Value> {
  map_res(
    recognize(pair(opt(alt((one_char('-'), one_char('+')))), digit1)),
    |text: &str| text.parse::<Value>()
  )(input)
}

fn separator(input: &str) -> IResult<&str, &str> {
  recognize(tuple((space0, alt((tag(","), line_ending)), multispace0)))(input)
}

fn program(input: &str) -> IResult<&str, Vec<Value>> {
  all_consuming(
    delimited(multispace0, separated_list(separator, value), multispace0)
  )(input)
}

/// Builds a `VmError::Parse` pointing at the first thing after `rest` that is not a separator.
fn syntax_error(text: &str, rest: &str) -> VmError {
  let rest   = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
  let offset = text.len() - rest.len();
  let before = &text[..offset];

  let line   = before.matches('\n').count() + 1;
  let column = match before.rfind('\n') {
    Some(newline) => before[newline + 1..].chars().count() + 1,
    None          => before.chars().count() + 1
  };
  let found  = match rest.split(|c: char| c == ',' || c.is_whitespace()).next() {
    Some(token) if !token.is_empty() => token.to_string(),
    _                                => "end of input".to_string()
  };

  VmError::Parse { line, column, found }
}

// endregion

impl FromStr for Program {
  type Err = VmError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    match program(text) {
      Ok((_rest, words))                                  => Ok(Program::new(words)),
      Err(NomErr::Error((rest, _kind)))
      | Err(NomErr::Failure((rest, _kind)))               => Err(syntax_error(text, rest)),
      Err(NomErr::Incomplete(_needed))                    => Err(syntax_error(text, ""))
    }
  }
}
