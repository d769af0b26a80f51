//! Small shared helpers for 1-D numeric sequences.

use ndarray::ArrayView1;

/// First element of a non-empty 1-D view.
///
/// # Panics
/// - Panics if `seq` is empty. Callers pass views that have already been
///   validated to hold at least two entries.
pub fn first<T: Copy>(seq: ArrayView1<'_, T>) -> T {
    seq[0]
}

/// Last element of a non-empty 1-D view.
///
/// # Panics
/// - Panics if `seq` is empty. Callers pass views that have already been
///   validated to hold at least two entries.
pub fn last<T: Copy>(seq: ArrayView1<'_, T>) -> T {
    seq[seq.len() - 1]
}
