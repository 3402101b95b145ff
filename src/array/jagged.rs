//! Jagged (list-of-lists) arrays.

use serde::{Deserialize, Serialize};

use super::ValueArray;
use crate::util::{ElementKind, Error, Result};

/// Flat `elements` partitioned into variable-length sub-arrays by a
/// non-decreasing `cumulative_length` integer array.
///
/// Sub-array `i` spans `elements[cumulative_length[i-1]..cumulative_length[i]]`,
/// with an implicit leading zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JaggedArray {
    pub elements: Box<ValueArray>,
    pub cumulative_length: Box<ValueArray>,
}

impl JaggedArray {
    pub fn new(elements: ValueArray, cumulative_length: ValueArray) -> Self {
        Self {
            elements: Box::new(elements),
            cumulative_length: Box::new(cumulative_length),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let kind = self.cumulative_length.element_kind();
        if kind != ElementKind::Integer {
            return Err(Error::type_mismatch(ElementKind::Integer, kind)
                .in_array("cumulative_length"));
        }
        if self.cumulative_length.count_per_value != 1 {
            return Err(Error::malformed("cumulative lengths must hold one value per position")
                .in_array("cumulative_length"));
        }
        Ok(())
    }
}
