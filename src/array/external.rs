//! External pointer arrays.
//!
//! The values live in an external binary dataset store. The array holds
//! one or more parts, each addressing a hyper-rectangular window of a
//! dataset; the parts concatenate in declaration order.

use serde::{Deserialize, Serialize};

use crate::core::{DatasetPath, ReadRequest};
use crate::util::{DimVec, ElementKind, Error, Result, ResultExt};

/// How null elements are represented in an array's values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullValue {
    /// No null representation (booleans, strings).
    None,
    /// NaN marks null floats.
    NaN,
    /// Explicit sentinel for integers.
    Integer(i64),
}

impl NullValue {
    /// Check this convention is legal for `kind`.
    pub fn check_kind(&self, kind: ElementKind) -> Result<()> {
        let ok = matches!(
            (kind, self),
            (ElementKind::Float, Self::NaN)
                | (ElementKind::Integer, Self::Integer(_))
                | (ElementKind::Boolean, Self::None)
                | (ElementKind::String, Self::None)
        );
        if ok {
            Ok(())
        } else {
            Err(Error::malformed(format!(
                "null value {:?} is not valid for {} arrays",
                self, kind
            )))
        }
    }
}

/// Window of one external dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDataArrayPart {
    /// Per-dimension element counts, each at least 1.
    pub count: DimVec,
    /// Per-dimension start offsets, same rank as `count`.
    pub start_index: DimVec,
    pub path_in_external_file: DatasetPath,
    /// Identity of the store holding the dataset.
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ExternalDataArrayPart {
    /// Part covering `count` elements from `start_index` of a dataset.
    pub fn new(
        uri: impl Into<String>,
        path: impl Into<DatasetPath>,
        start_index: &[usize],
        count: &[usize],
    ) -> Self {
        Self {
            count: DimVec::from_slice(count),
            start_index: DimVec::from_slice(start_index),
            path_in_external_file: path.into(),
            uri: uri.into(),
            mime_type: None,
        }
    }

    /// Whole 1-D range `[start, start + len)`.
    pub fn range(uri: impl Into<String>, path: impl Into<DatasetPath>, start: usize, len: usize) -> Self {
        Self::new(uri, path, &[start], &[len])
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.count.is_empty() {
            return Err(Error::malformed("external part has no count"));
        }
        if self.count.len() != self.start_index.len() {
            return Err(Error::malformed(format!(
                "count rank {} differs from start_index rank {}",
                self.count.len(),
                self.start_index.len()
            )));
        }
        if let Some(d) = self.count.iter().position(|&c| c == 0) {
            return Err(Error::malformed(format!("count[{}] must be at least 1", d)));
        }
        if self.path_in_external_file.is_empty() {
            return Err(Error::malformed("external part has an empty dataset path"));
        }
        for (&s, &c) in self.start_index.iter().zip(self.count.iter()) {
            if s.checked_add(c).is_none() {
                return Err(Error::malformed("external window end overflows"));
            }
        }
        self.checked_len()
            .map(|_| ())
            .ok_or_else(|| Error::malformed("external window size overflows"))
    }

    fn checked_len(&self) -> Option<usize> {
        self.count.iter().try_fold(1usize, |acc, &c| acc.checked_mul(c))
    }

    /// Number of values in the window.
    pub fn len(&self) -> usize {
        self.count.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when both parts address intersecting windows of the same dataset.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.uri == other.uri
            && self.path_in_external_file == other.path_in_external_file
            && self.count.len() == other.count.len()
            && (0..self.count.len()).all(|d| {
                let (a0, a1) = (self.start_index[d], self.start_index[d] + self.count[d]);
                let (b0, b1) = (other.start_index[d], other.start_index[d] + other.count[d]);
                a0 < b1 && b0 < a1
            })
    }

    /// Read request for this window.
    pub fn request(&self, kind: ElementKind) -> ReadRequest<'_> {
        ReadRequest {
            uri: &self.uri,
            path: &self.path_in_external_file,
            start: &self.start_index,
            count: &self.count,
            kind,
        }
    }
}

/// Array whose values are stored in external datasets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalArray {
    pub kind: ElementKind,
    pub parts: Vec<ExternalDataArrayPart>,
    pub null_value: NullValue,
}

impl ExternalArray {
    /// Float array; NaN marks nulls.
    pub fn float(parts: Vec<ExternalDataArrayPart>) -> Self {
        Self { kind: ElementKind::Float, parts, null_value: NullValue::NaN }
    }

    /// Integer array with its explicit null sentinel.
    pub fn integer(parts: Vec<ExternalDataArrayPart>, null_value: i64) -> Self {
        Self {
            kind: ElementKind::Integer,
            parts,
            null_value: NullValue::Integer(null_value),
        }
    }

    /// Boolean array; booleans have no null.
    pub fn boolean(parts: Vec<ExternalDataArrayPart>) -> Self {
        Self { kind: ElementKind::Boolean, parts, null_value: NullValue::None }
    }

    /// String array.
    pub fn string(parts: Vec<ExternalDataArrayPart>) -> Self {
        Self { kind: ElementKind::String, parts, null_value: NullValue::None }
    }

    /// Total number of values across all parts.
    pub fn len(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Structural checks, plus overlap rejection unless `allow_overlap`.
    pub fn validate(&self, allow_overlap: bool) -> Result<()> {
        if self.parts.is_empty() {
            return Err(Error::malformed("external array has no parts"));
        }
        self.null_value.check_kind(self.kind)?;
        for (i, part) in self.parts.iter().enumerate() {
            part.validate().in_array(format!("part[{}]", i))?;
        }
        if !allow_overlap {
            for (i, a) in self.parts.iter().enumerate() {
                if let Some(j) = self.parts[i + 1..].iter().position(|b| a.overlaps(b)) {
                    return Err(Error::malformed(format!(
                        "parts {} and {} overlap in {}:{}",
                        i,
                        i + 1 + j,
                        a.uri,
                        a.path_in_external_file
                    )));
                }
            }
        }
        Ok(())
    }

    /// One read request per part, in declaration order.
    pub fn requests(&self) -> Vec<ReadRequest<'_>> {
        self.parts.iter().map(|p| p.request(self.kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_rank_mismatch() {
        let mut p = ExternalDataArrayPart::new("f.h5", "/g/d", &[0, 0], &[2, 3]);
        p.validate().unwrap();
        assert_eq!(p.len(), 6);
        p.start_index.pop();
        assert!(matches!(p.validate(), Err(Error::MalformedArray(_))));
    }

    #[test]
    fn test_part_zero_count() {
        let p = ExternalDataArrayPart::new("f.h5", "/d", &[0], &[0]);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_null_conventions() {
        assert!(ExternalArray::float(vec![ExternalDataArrayPart::range("f", "/d", 0, 1)])
            .validate(false)
            .is_ok());
        let mut bad = ExternalArray::boolean(vec![ExternalDataArrayPart::range("f", "/d", 0, 1)]);
        bad.null_value = NullValue::Integer(0);
        assert!(matches!(bad.validate(false), Err(Error::MalformedArray(_))));
    }

    #[test]
    fn test_overlapping_parts() {
        let a = ExternalArray::integer(
            vec![
                ExternalDataArrayPart::range("f", "/d", 0, 5),
                ExternalDataArrayPart::range("f", "/d", 4, 4),
            ],
            -1,
        );
        assert!(matches!(a.validate(false), Err(Error::MalformedArray(_))));
        assert!(a.validate(true).is_ok());

        let disjoint = ExternalArray::integer(
            vec![
                ExternalDataArrayPart::range("f", "/d", 0, 5),
                ExternalDataArrayPart::range("f", "/d", 5, 3),
                ExternalDataArrayPart::range("f", "/other", 0, 5),
            ],
            -1,
        );
        assert!(disjoint.validate(false).is_ok());
        assert_eq!(disjoint.len(), 13);
    }

    #[test]
    fn test_part_error_names_part() {
        let a = ExternalArray::float(vec![
            ExternalDataArrayPart::range("f", "/d", 0, 2),
            ExternalDataArrayPart::new("f", "/d", &[2], &[1, 1]),
        ]);
        let err = a.validate(false).unwrap_err();
        assert!(err.to_string().contains("part[1]"));
    }

    #[test]
    fn test_requests_carry_kind() {
        let a = ExternalArray::float(vec![ExternalDataArrayPart::new("f", "/d", &[1, 0], &[2, 2])]);
        let reqs = a.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].kind, ElementKind::Float);
        assert_eq!(reqs[0].start, &[1, 0]);
        assert_eq!(reqs[0].len(), 4);
    }
}
