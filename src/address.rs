//! A validated index into the tape. Effective addresses are computed with signed arithmetic
//! (operand plus relative base), so every one of them passes through here before it touches
//! memory.

use std::fmt::{Display, Formatter};
use std::ops::Add;

use crate::error::VmError;
use crate::Value;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(AddressNumberType);

impl Address {
  /// Converts the address to an index into the tape vector.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }

  pub fn from_idx(idx: AddressNumberType) -> Address {
    Address(idx)
  }
}

impl TryFrom<Value> for Address {
  type Error = VmError;

  /// Negative addresses do not exist. Positive ones always do, since the tape grows on write.
  fn try_from(value: Value) -> Result<Self, Self::Error> {
    match AddressNumberType::try_from(value) {
      Ok(idx) => Ok(Address(idx)),
      Err(_)  => Err(VmError::AddressOutOfRange { address: value })
    }
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "TAPE[{}]", self.0)
  }
}

// Increment an address
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address(self.0 + rhs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_negative_values_are_addresses(){
    assert_eq!(Address::try_from(0 as Value).unwrap().idx(), 0);
    assert_eq!(Address::try_from(4096 as Value).unwrap().idx(), 4096);
    assert_eq!(Address::try_from(7 as Value).unwrap() + 3, Address::from_idx(10));
  }

  #[test]
  fn negative_values_are_rejected(){
    match Address::try_from(-1 as Value) {
      Err(VmError::AddressOutOfRange { address }) => assert_eq!(address, -1),
      other => panic!("expected AddressOutOfRange, got {:?}", other)
    }
  }

  #[test]
  fn display(){
    assert_eq!(format!("{}", Address::from_idx(12)), "TAPE[12]");
  }
}
