//! Constant-fill arrays.

use serde::{Deserialize, Serialize};

use super::Values;
use crate::util::{Error, Result, Scalar};

/// One value replicated `count` times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantArray {
    pub value: Scalar,
    pub count: usize,
}

impl ConstantArray {
    pub fn new(value: impl Into<Scalar>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::malformed("constant array count must be at least 1"));
        }
        Ok(())
    }

    pub fn resolve(&self) -> Values {
        Values::repeat(&self.value, self.count)
    }
}
