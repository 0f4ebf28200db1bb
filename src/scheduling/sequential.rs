//! Sequential back-end of the analysis

use crate::{task::DijetImbalanceTask, Result};

/// Analyze event batches in sequential mode
///
/// Batches are analyzed by separate tasks even in sequential mode, in order
/// to achieve reproducibility with respect to multi-threaded runs.
///
pub fn run_analysis_impl<'cfg>(
    batch_sizes: &[usize],
    analyze_batch: impl Fn(usize, usize) -> Result<DijetImbalanceTask<'cfg>>,
) -> Result<DijetImbalanceTask<'cfg>> {
    // Initialize the accumulator with the first batch of events
    let (&first_batch_size, other_batches) = batch_sizes
        .split_first()
        .expect("There should be at least one batch");
    let mut accumulator = analyze_batch(0, first_batch_size)?;

    // Analyze and integrate the other batches
    for (batch_id, &batch_size) in other_batches.iter().enumerate() {
        let batch = analyze_batch(batch_id + 1, batch_size)?;
        accumulator.merge(&batch)?;
    }
    Ok(accumulator)
}
