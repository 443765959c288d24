use super::engine::evaluate;
use super::types::{
    MAX_DECLINE_PERCENT, Scenario, SimulationResult, SimulationSample, SimulationStatistics,
};

/// Display cap on retained samples; statistics always cover every run.
pub const RETAINED_SAMPLE_CAP: usize = 100;

#[derive(Copy, Clone, Debug)]
pub struct SimulationConfig {
    pub runs: u32,
    pub uncertainty_range_percent: f64,
}

/// Small deterministic xorshift64* generator. Callers seed it explicitly;
/// the sampler never owns a randomness source of its own.
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform draw in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    /// Uniform draw in (-1, 1).
    pub fn next_symmetric(&mut self) -> f64 {
        2.0 * self.next_f64() - 1.0
    }
}

/// Runs the uncertainty simulation: per run, perturb the decline rate by a
/// uniform draw scaled to the uncertainty range, clamp it to the model's
/// decline domain, and re-evaluate the engine.
///
/// Without a generator (or with zero runs) the result degenerates to the
/// scenario's single-point difference: empty sample list, every statistic
/// equal to that difference, zero spread.
pub fn run_simulation(
    scenario: &Scenario,
    config: SimulationConfig,
    rng: Option<&mut Rng>,
) -> SimulationResult {
    let Some(rng) = rng else {
        return degenerate_result(scenario);
    };
    if config.runs == 0 {
        return degenerate_result(scenario);
    }

    let mut samples = Vec::with_capacity(RETAINED_SAMPLE_CAP.min(config.runs as usize));
    let mut differences = Vec::with_capacity(config.runs as usize);
    for run_index in 0..config.runs {
        let offset = rng.next_symmetric() * config.uncertainty_range_percent;
        let sampled_decline = (scenario.decline_percent + offset).clamp(0.0, MAX_DECLINE_PERCENT);
        let result = evaluate(&scenario.with_decline(sampled_decline));
        differences.push(result.difference);
        if samples.len() < RETAINED_SAMPLE_CAP {
            samples.push(SimulationSample {
                run_index,
                sampled_decline_percent: sampled_decline,
                difference: result.difference,
                new_vat: result.new_vat,
            });
        }
    }

    SimulationResult {
        samples,
        statistics: summarize(&differences),
    }
}

fn degenerate_result(scenario: &Scenario) -> SimulationResult {
    let point = evaluate(scenario).difference;
    SimulationResult {
        samples: Vec::new(),
        statistics: SimulationStatistics {
            average: point,
            median: point,
            p5: point,
            p95: point,
            standard_deviation: 0.0,
        },
    }
}

// Percentiles by rank position floor(n * q) on one sorted array, without
// interpolation; the deviation is the population form.
fn summarize(differences: &[f64]) -> SimulationStatistics {
    let n = differences.len();
    let average = differences.iter().sum::<f64>() / n as f64;

    let mut sorted = differences.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = |q: f64| sorted[((n as f64 * q).floor() as usize).min(n - 1)];

    let variance = differences
        .iter()
        .map(|x| (x - average) * (x - average))
        .sum::<f64>()
        / n as f64;

    SimulationStatistics {
        average,
        median: rank(0.5),
        p5: rank(0.05),
        p95: rank(0.95),
        standard_deviation: variance.sqrt(),
    }
}
