pub mod climate;
mod compare_floats;
pub mod core;
pub mod errors;
pub mod forward_translator;
pub mod input;

#[macro_use]
extern crate is_close;

pub use crate::climate::{ClimateLibrary, ClimateSource, ClimateSummary, MonthlyClimate};
pub use crate::core::end_uses::{EndUse, EndUseFuelMap, FuelType};
pub use crate::core::month::Month;
pub use crate::core::results::{MonthlyResult, Results, ResultsError};
pub use crate::core::sim_model::SimModel;
pub use crate::core::user_model::UserModel;
pub use crate::errors::{IsoModelError, TranslationError, ValidationError};
pub use crate::forward_translator::ForwardTranslator;

use crate::input::ingest_for_processing;
use rayon::prelude::*;
use std::io::Read;
use tracing::debug;

/// Run a building described in JSON through translation, compilation and simulation.
pub fn run_model(
    input: impl Read,
    climates: &impl ClimateSource,
) -> Result<Results, IsoModelError> {
    let description = ingest_for_processing(input)?;

    let mut translator = ForwardTranslator::new();
    let user_model = translator.translate(&description)?;
    let sim_model = user_model.compile(climates)?;

    Ok(sim_model.simulate())
}

/// Simulate independent models in parallel. Results are in the order of the models.
pub fn simulate_all(models: &[SimModel]) -> Vec<Results> {
    debug!(model_count = models.len(), "Simulating models in parallel");

    models.par_iter().map(SimModel::simulate).collect()
}

/// Run several JSON building descriptions in parallel against a shared set of climates,
/// failing on the first description that cannot be run.
pub fn run_models<S: AsRef<str> + Sync>(
    inputs: &[S],
    climates: &(impl ClimateSource + Sync),
) -> anyhow::Result<Vec<Results>> {
    inputs
        .par_iter()
        .map(|input| Ok(run_model(input.as_ref().as_bytes(), climates)?))
        .collect::<anyhow::Result<Vec<Results>>>()
}
