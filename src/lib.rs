use crate::event::{Event, EventSetup, MissingProductError};
use crate::params::ConfigError;
use thiserror::Error;

/// Data products and the per-event boundary with the driving framework.
pub mod event;
/// Generator-level event records.
pub mod hepmc;
/// Heavy-ion event summary.
pub mod hi_event;
/// Fixed-binning histograms.
pub mod hist;
/// Module configuration.
pub mod params;
/// Particle property table.
pub mod pdt;
/// Detector simulation records.
pub mod sim;
/// Calorimeter deposit classification.
pub mod xtal_dedx;

pub use hi_event::{HeavyIonEventSummarizer, HeavyIonEventSummary};
pub use xtal_dedx::CalorimeterDepositClassifier;

/// Errors that abort the processing of one event (or, for
/// [`Error::Config`], the construction of a module).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MissingProduct(#[from] MissingProductError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no particle data for PDG id {0}")]
    UnknownParticle(i32),
}

/// A module that makes one product per event.
///
/// The framework calls [`Producer::produce`] once per event, in order, and
/// takes ownership of the returned product.
pub trait Producer {
    type Product;

    fn produce(&mut self, event: &Event, setup: &EventSetup) -> Result<Self::Product, Error>;
}

/// A module that only reads events, e.g. to fill histograms that live for
/// the whole run.
pub trait Analyzer {
    fn analyze(&mut self, event: &Event, setup: &EventSetup) -> Result<(), Error>;
}
