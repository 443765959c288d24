use super::types::{
    CalculationResult, InputBasis, NEW_RATE, OLD_RATE, ProjectionYear, Scenario, SensitivityPoint,
};

/// Evaluates one scenario against the 7% -> 15% rate change.
///
/// Pure and total over the constrained input domain: a zero old-rate
/// liability yields `percentage_change = 0` and `revenue_efficiency = None`
/// instead of a non-finite value, and a break-even outside [0, 100] is
/// returned as-is.
pub fn evaluate(scenario: &Scenario) -> CalculationResult {
    let inflation_multiplier = 1.0 + scenario.inflation_percent / 100.0;
    let decline_multiplier = 1.0 - scenario.decline_percent / 100.0;

    let (base_net, base_gross) = match scenario.basis {
        InputBasis::Net => (scenario.base_revenue, scenario.base_revenue * (1.0 + OLD_RATE)),
        InputBasis::Gross => (scenario.base_revenue / (1.0 + OLD_RATE), scenario.base_revenue),
    };
    let old_vat = base_net * OLD_RATE;

    // The decline and inflation apply to whichever figure the user supplied;
    // the gross->net divisor switches to the new rate on the post-change side.
    let (declined_net, declined_gross, new_vat, break_even_decline_percent) = match scenario.basis {
        InputBasis::Net => {
            let declined_net = base_net * inflation_multiplier * decline_multiplier;
            let declined_gross = declined_net * (1.0 + NEW_RATE);
            let new_vat = declined_net * NEW_RATE;
            let break_even = 100.0 * (1.0 - OLD_RATE / (NEW_RATE * inflation_multiplier));
            (declined_net, declined_gross, new_vat, break_even)
        }
        InputBasis::Gross => {
            let declined_gross = base_gross * inflation_multiplier * decline_multiplier;
            let declined_net = declined_gross / (1.0 + NEW_RATE);
            let new_vat = declined_gross * NEW_RATE / (1.0 + NEW_RATE);
            let old_share = OLD_RATE / (1.0 + OLD_RATE);
            let new_share = NEW_RATE / (1.0 + NEW_RATE);
            let break_even = 100.0 * (1.0 - old_share / (inflation_multiplier * new_share));
            (declined_net, declined_gross, new_vat, break_even)
        }
    };

    let difference = new_vat - old_vat;
    let percentage_change = if old_vat == 0.0 {
        0.0
    } else {
        difference / old_vat * 100.0
    };
    let vat_rate_change_percent = (NEW_RATE - OLD_RATE) / OLD_RATE * 100.0;
    let demand_elasticity = if scenario.decline_percent > 0.0 {
        -(scenario.decline_percent * 100.0) / vat_rate_change_percent
    } else {
        0.0
    };
    let revenue_efficiency = if old_vat == 0.0 {
        None
    } else {
        Some(new_vat / old_vat)
    };
    let deadweight_loss =
        base_net * (scenario.decline_percent / 100.0) * (NEW_RATE - OLD_RATE) * 0.5;

    CalculationResult {
        net_revenue_before: base_net,
        gross_revenue_before: base_gross,
        net_revenue_after: declined_net,
        gross_revenue_after: declined_gross,
        old_vat,
        new_vat,
        difference,
        percentage_change,
        break_even_decline_percent,
        vat_rate_change_percent,
        demand_elasticity,
        revenue_efficiency,
        deadweight_loss,
    }
}

/// Multi-year receipts projection. The baseline year keeps the old rate and
/// the undiminished base; the reform year applies the decline as a persistent
/// level shift and collects at the new rate. Inflation compounds annually on
/// both sides under the scenario's basis convention.
pub fn project_cumulative(scenario: &Scenario, years: u32) -> Vec<ProjectionYear> {
    let decline_multiplier = 1.0 - scenario.decline_percent / 100.0;
    let inflation_multiplier = 1.0 + scenario.inflation_percent / 100.0;

    let (base_net, base_gross) = match scenario.basis {
        InputBasis::Net => (scenario.base_revenue, scenario.base_revenue * (1.0 + OLD_RATE)),
        InputBasis::Gross => (scenario.base_revenue / (1.0 + OLD_RATE), scenario.base_revenue),
    };

    let mut rows = Vec::with_capacity(years as usize);
    let mut cumulative_difference = 0.0;
    let mut compounded = 1.0;
    for year in 1..=years {
        compounded *= inflation_multiplier;
        let baseline_vat = base_net * compounded * OLD_RATE;
        let reformed_vat = match scenario.basis {
            InputBasis::Net => base_net * compounded * decline_multiplier * NEW_RATE,
            InputBasis::Gross => {
                base_gross * compounded * decline_multiplier * NEW_RATE / (1.0 + NEW_RATE)
            }
        };
        let difference = reformed_vat - baseline_vat;
        cumulative_difference += difference;
        rows.push(ProjectionYear {
            year,
            baseline_vat,
            reformed_vat,
            difference,
            cumulative_difference,
        });
    }
    rows
}

/// Re-evaluates the scenario once per decline step, all other inputs fixed.
pub fn sensitivity_sweep(scenario: &Scenario, decline_steps: &[f64]) -> Vec<SensitivityPoint> {
    decline_steps
        .iter()
        .map(|&decline_percent| {
            let result = evaluate(&scenario.with_decline(decline_percent));
            SensitivityPoint {
                decline_percent,
                old_vat: result.old_vat,
                new_vat: result.new_vat,
                difference: result.difference,
            }
        })
        .collect()
}
