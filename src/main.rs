//! Driver of the dijet imbalance analysis: runs the task on toy events

use dijet_imbalance::{
    config::Configuration, evgen::EventGenerator, output, random::RandomGenerator, scheduling,
    task::DijetImbalanceTask, Result,
};

use env_logger::{Builder, Env};
use eyre::WrapErr;
use log::debug;
use std::{env, time::Instant};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG: &str = "dijet.cfg";

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    // ### CONFIGURATION READOUT ###

    let config_file = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_owned());
    let cfg = Configuration::load(&config_file).wrap_err("Failed to load the configuration")?;

    // Start the clock after configuration I/O
    let saved_time = Instant::now();

    // Initialize the event generator
    let evgen = EventGenerator::new(&cfg);

    // ### ANALYSIS EXECUTION ###

    // This kernel generates and analyzes a batch of events, given its index
    // and size, and returns the task holding the batch's histograms
    let analyze_batch = |batch_id: usize, num_events: usize| -> Result<DijetImbalanceTask> {
        let mut rng = RandomGenerator::for_batch(batch_id);
        let mut task = DijetImbalanceTask::new(&cfg)?;
        for _ in 0..num_events {
            let event = evgen.generate(&mut rng);
            task.process_event(&event)?;
        }
        debug!("Batch {} done ({} events)", batch_id, num_events);
        Ok(task)
    };

    // Run the analysis
    let task = scheduling::run_analysis(cfg.num_events, analyze_batch)?;

    // ### RESULTS DISPLAY ###

    let elapsed_time = saved_time.elapsed();
    output::dump_results(&cfg, &task, elapsed_time).wrap_err("Failed to output the results")?;

    Ok(())
}
