//! Dijet imbalance: a jet quenching analysis task
//!
//!
//! # Introduction (for the physicist)
//!
//! In heavy-ion collisions, a pair of back-to-back jets loses energy while
//! crossing the quark-gluon plasma, and the two jets generally do not lose the
//! same amount. This task measures that imbalance through the momentum
//! asymmetry A_J = (pt1 - pt2) / (pt1 + pt2) and the momentum balance
//! x_J = pt2 / pt1 of dijets, for a grid of trigger thresholds, associated jet
//! thresholds and leading hadron requirements. Triggers which have no
//! associated jet are recorded separately.
//!
//! Alongside the dijet observables, the task fills quality assurance
//! histograms for jets, tracks, calorimeter clusters and calorimeter cells.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The analysis follows the lifecycle of its host framework:
//!
//! * At setup time, every histogram that may ever be filled is created in a
//!   [`registry::HistRegistry`], keyed by a structured [`registry::HistKey`].
//! * For each event, the [`dijet`] search runs on every jet container, then
//!   the [`qa`] loops run on every container.
//! * Independent tasks can process separate batches of events, and their
//!   registries are then merged in a fixed order.
//!
//! Filling a histogram which was not created is an error, so the allocation
//! and fill phases cannot silently drift apart.

#![warn(missing_docs)]

pub mod alloc;
pub mod config;
pub mod container;
pub mod dijet;
pub mod event;
pub mod evgen;
pub mod grid;
pub mod histogram;
pub mod numeric;
pub mod output;
pub mod qa;
pub mod random;
pub mod registry;
pub mod scheduling;
pub mod task;

/// We'll use eyre's type-erased result type throughout the application
pub type Result<T, E = eyre::Report> = std::result::Result<T, E>;
