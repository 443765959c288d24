mod engine;
mod sampler;
mod types;

pub use engine::{evaluate, project_cumulative, sensitivity_sweep};
pub use sampler::{RETAINED_SAMPLE_CAP, Rng, SimulationConfig, run_simulation};
pub use types::{
    CalculationResult, InputBasis, MAX_DECLINE_PERCENT, NEW_RATE, OLD_RATE, ProjectionYear,
    Scenario, SensitivityPoint, SimulationResult, SimulationSample, SimulationStatistics,
};
