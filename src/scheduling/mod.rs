//! This module takes care of scheduling the analysis work, encapsulating use
//! of multiple threads

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::{task::DijetImbalanceTask, Result};

use log::debug;

/// Size of the analyzed event batches
///
/// Events are grouped in batches of a certain size, each analyzed by its own
/// task with its own random number generator. Task results are then merged
/// in batch order, which makes sequential and parallel runs produce the same
/// histograms.
///
pub const EVENT_BATCH_SIZE: usize = 10_000;

/// Sizes of the successive event batches
fn batch_sizes(num_events: usize) -> impl Iterator<Item = usize> {
    let num_batches = (num_events + EVENT_BATCH_SIZE - 1) / EVENT_BATCH_SIZE;
    (0..num_batches).map(move |batch_id| {
        let first_event = batch_id * EVENT_BATCH_SIZE;
        (num_events - first_event).min(EVENT_BATCH_SIZE)
    })
}

/// Run the analysis in the manner that was configured at build time.
///
/// Takes as parameters the total number of events to be analyzed, and an
/// analysis kernel that processes a batch of events given its index and size,
/// returning the task that analyzed it.
///
/// Returns the task holding the merged results of every batch.
///
pub fn run_analysis<'cfg>(
    num_events: usize,
    analyze_batch: impl Send + Sync + Fn(usize, usize) -> Result<DijetImbalanceTask<'cfg>>,
) -> Result<DijetImbalanceTask<'cfg>> {
    // Check that the user is being reasonable (should have already been checked
    // at configuration time, but bugs can happen...)
    assert!(num_events > 0, "Must analyze at least one event");
    let batches = batch_sizes(num_events).collect::<Vec<_>>();
    debug!("Analyzing {} events in {} batches", num_events, batches.len());

    // Analyze the batches...
    {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_analysis_impl(&batches, analyze_batch)
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_analysis_impl(&batches, analyze_batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batching() {
        assert_eq!(batch_sizes(1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(
            batch_sizes(EVENT_BATCH_SIZE).collect::<Vec<_>>(),
            vec![EVENT_BATCH_SIZE]
        );
        assert_eq!(
            batch_sizes(2 * EVENT_BATCH_SIZE + 3).collect::<Vec<_>>(),
            vec![EVENT_BATCH_SIZE, EVENT_BATCH_SIZE, 3]
        );
    }
}
