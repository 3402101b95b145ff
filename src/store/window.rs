//! Hyper-rectangular window arithmetic over row-major datasets.

use crate::util::{Dimensions, DimVec, Error, Result};

/// Check that `[start, start + count)` fits inside `dims`.
pub fn check_window(dims: &Dimensions, start: &[usize], count: &[usize]) -> Result<()> {
    if start.len() != dims.rank() || count.len() != dims.rank() {
        return Err(Error::shape(format!(
            "window of rank {} does not match dataset rank {} {}",
            count.len(),
            dims.rank(),
            dims
        )));
    }
    for (d, ((&s, &c), &extent)) in start.iter().zip(count).zip(dims.sizes()).enumerate() {
        match s.checked_add(c) {
            Some(end) if end <= extent => {}
            _ => {
                return Err(Error::shape(format!(
                    "window [{}, {}+{}) exceeds extent {} of dimension {} in {}",
                    s, s, c, extent, d, dims
                )))
            }
        }
    }
    Ok(())
}

/// Contiguous runs `(flat_offset, len)` covering the window, in row-major
/// order. Adjacent runs are merged.
pub fn window_runs(dims: &Dimensions, start: &[usize], count: &[usize]) -> Result<Vec<(usize, usize)>> {
    check_window(dims, start, count)?;
    let rank = dims.rank();
    if rank == 0 || count.iter().any(|&c| c == 0) {
        return Ok(Vec::new());
    }

    let strides = dims.strides();
    let run_len = count[rank - 1];
    let rows: usize = count[..rank - 1].iter().product();
    let mut runs: Vec<(usize, usize)> = Vec::with_capacity(rows);

    // Odometer over every dimension but the fastest one
    let mut idx: DimVec = smallvec::smallvec![0; rank - 1];
    for _ in 0..rows {
        let offset = idx
            .iter()
            .enumerate()
            .map(|(d, &i)| (start[d] + i) * strides[d])
            .sum::<usize>()
            + start[rank - 1];
        match runs.last_mut() {
            Some((prev, len)) if *prev + *len == offset => *len += run_len,
            _ => runs.push((offset, run_len)),
        }
        for d in (0..rank - 1).rev() {
            idx[d] += 1;
            if idx[d] < count[d] {
                break;
            }
            idx[d] = 0;
        }
    }
    Ok(runs)
}
