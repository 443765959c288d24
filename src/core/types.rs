use serde::Serialize;

/// VAT rate in force before the reform.
pub const OLD_RATE: f64 = 0.07;
/// VAT rate in force after the reform.
pub const NEW_RATE: f64 = 0.15;

/// Upper bound on the revenue decline the model accepts, in percent.
pub const MAX_DECLINE_PERCENT: f64 = 80.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputBasis {
    /// The revenue figure excludes VAT (taxable base).
    Net,
    /// The revenue figure includes VAT at the old rate.
    Gross,
}

/// One evaluation's worth of inputs. Built by the caller, never mutated
/// by the engine; the sampler derives per-run copies via `with_decline`.
#[derive(Copy, Clone, Debug)]
pub struct Scenario {
    pub basis: InputBasis,
    pub base_revenue: f64,
    pub decline_percent: f64,
    pub inflation_percent: f64,
}

impl Scenario {
    pub fn with_decline(self, decline_percent: f64) -> Self {
        Self {
            decline_percent,
            ..self
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub net_revenue_before: f64,
    pub gross_revenue_before: f64,
    pub net_revenue_after: f64,
    pub gross_revenue_after: f64,
    pub old_vat: f64,
    pub new_vat: f64,
    pub difference: f64,
    pub percentage_change: f64,
    pub break_even_decline_percent: f64,
    pub vat_rate_change_percent: f64,
    pub demand_elasticity: f64,
    /// `new_vat / old_vat`; `None` when the old-rate liability is zero,
    /// which callers must surface as "not defined" rather than 0.
    pub revenue_efficiency: Option<f64>,
    pub deadweight_loss: f64,
}

/// One Monte Carlo draw retained for display.
#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSample {
    pub run_index: u32,
    pub sampled_decline_percent: f64,
    pub difference: f64,
    pub new_vat: f64,
}

/// Summary of `difference` across every run, not just retained samples.
#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStatistics {
    pub average: f64,
    pub median: f64,
    pub p5: f64,
    pub p95: f64,
    pub standard_deviation: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub samples: Vec<SimulationSample>,
    pub statistics: SimulationStatistics,
}

/// One row of the cumulative multi-year projection. The baseline keeps the
/// old rate with no decline; the reform applies the decline and the new rate.
#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub baseline_vat: f64,
    pub reformed_vat: f64,
    pub difference: f64,
    pub cumulative_difference: f64,
}

/// One point of the decline sensitivity sweep.
#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityPoint {
    pub decline_percent: f64,
    pub old_vat: f64,
    pub new_vat: f64,
    pub difference: f64,
}
