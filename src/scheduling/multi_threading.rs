//! Multi-threaded back-end of the analysis

use crate::{task::DijetImbalanceTask, Result};

use std::sync::Mutex;

/// Analyze event batches in multi-threaded mode
///
/// Each batch is analyzed by its own rayon task, and the results are merged
/// in batch order once every task is done.
///
pub fn run_analysis_impl<'cfg>(
    batch_sizes: &[usize],
    analyze_batch: impl Send + Sync + Fn(usize, usize) -> Result<DijetImbalanceTask<'cfg>>,
) -> Result<DijetImbalanceTask<'cfg>> {
    let accumulator = ReproducibleAccumulator::new(batch_sizes.len());

    // This function is a synchronization scope: it will only return
    // once all inner tasks have been executed
    rayon::scope(|scope| {
        for (batch_id, &batch_size) in batch_sizes.iter().enumerate() {
            let accumulator_ref = &accumulator;
            let analyze_batch_ref = &analyze_batch;
            scope.spawn(move |_| {
                let result = analyze_batch_ref(batch_id, batch_size);
                accumulator_ref.set_task_result(batch_id, result);
            });
        }
    });

    accumulator.get_merged_result()
}

/// Reproducible results accumulation mechanism
struct ReproducibleAccumulator<'cfg> {
    /// Storage for the intermediary results of parallel tasks
    results: Box<[Mutex<Option<Result<DijetImbalanceTask<'cfg>>>>]>,
}
//
impl<'cfg> ReproducibleAccumulator<'cfg> {
    /// Set up results storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        assert!(num_tasks > 0, "There should be at least one task");
        Self {
            results: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Record the results of the n-th analysis task
    fn set_task_result(&self, task_id: usize, result: Result<DijetImbalanceTask<'cfg>>) {
        let mut lock = self.results[task_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(lock.is_none(), "Tasks should not report results twice");
        *lock = Some(result);
    }

    /// Merge the results in batch order, reporting the first failure
    fn get_merged_result(self) -> Result<DijetImbalanceTask<'cfg>> {
        let mut results_iter = self.results.into_vec().into_iter().map(|entry| {
            entry
                .into_inner()
                .expect("Mutex data should be valid")
                .expect("Result should be ready")
        });

        let mut accumulator = results_iter
            .next()
            .expect("There should be at least one task")?;
        for result in results_iter {
            accumulator.merge(&result?)?;
        }
        Ok(accumulator)
    }
}
