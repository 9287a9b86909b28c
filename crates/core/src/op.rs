//! Wire codes carried by mutation batches.

use crate::error::Error;
use alloc::format;

/// Operation applied to a row in a mutation batch.
///
/// The discriminants are the store's wire encoding of the `psp_op` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    Insert = 0,
    Delete = 1,
}

impl Op {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Op {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Op::Insert),
            1 => Ok(Op::Delete),
            other => Err(Error::protocol_violation(format!(
                "unexpected op code {}",
                other
            ))),
        }
    }
}

/// How a single cell changed between the previous and current row state.
///
/// `Eq`/`Neq` compare the values, `T`/`F` say whether a valid value was
/// present before and after. `NeqTdt` marks a cell whose row was deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueTransition {
    EqFf = 0,
    EqTt = 1,
    NeqFt = 2,
    NeqTf = 3,
    NeqTt = 4,
    NeqTdt = 5,
}

impl ValueTransition {
    /// Classifies a cell from its validity and equality before and after.
    pub fn classify(prev_valid: bool, curr_valid: bool, equal: bool, deleted: bool) -> Self {
        if deleted {
            return if prev_valid {
                ValueTransition::NeqTdt
            } else {
                ValueTransition::EqFf
            };
        }
        match (prev_valid, curr_valid) {
            (false, false) => ValueTransition::EqFf,
            (false, true) => ValueTransition::NeqFt,
            (true, false) => ValueTransition::NeqTf,
            (true, true) if equal => ValueTransition::EqTt,
            (true, true) => ValueTransition::NeqTt,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ValueTransition {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ValueTransition::EqFf),
            1 => Ok(ValueTransition::EqTt),
            2 => Ok(ValueTransition::NeqFt),
            3 => Ok(ValueTransition::NeqTf),
            4 => Ok(ValueTransition::NeqTt),
            5 => Ok(ValueTransition::NeqTdt),
            other => Err(Error::protocol_violation(format!(
                "unexpected value transition {}",
                other
            ))),
        }
    }
}
