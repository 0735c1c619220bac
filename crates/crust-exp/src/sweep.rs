use crust_core::errors::{CrustError, ErrorInfo};
use crust_core::ParameterSet;
use serde::{Deserialize, Serialize};

/// Scheduler configuration bounding concurrent solver invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    #[serde(default = "Scheduler::default_parallelism")]
    pub parallelism: usize,
}

impl Scheduler {
    const fn default_parallelism() -> usize {
        1
    }

    pub fn with_parallelism(parallelism: usize) -> Self {
        Self { parallelism }
    }

    pub fn is_sequential(&self) -> bool {
        self.parallelism <= 1
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            parallelism: Self::default_parallelism(),
        }
    }
}

/// Upper bound on the points one parameter or a whole plan may expand to.
pub const MAX_PLAN_POINTS: usize = 1_000_000;

fn range_size_error(scope: &str, count: f64) -> CrustError {
    CrustError::Config(
        ErrorInfo::new(
            "crust_exp.range_size",
            format!("sweep expands to more than {MAX_PLAN_POINTS} points"),
        )
        .with_context("scope", scope.to_string())
        .with_context("points", count.to_string())
        .with_hint("widen `step` or split the sweep"),
    )
}

/// Values swept for a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridValues {
    /// Explicit enumeration.
    List { values: Vec<f64> },
    /// Half-open `[start, stop)` progression, `numpy.arange` style.
    Range { start: f64, stop: f64, step: f64 },
}

/// Grid parameter descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParameter {
    pub name: String,
    #[serde(flatten)]
    pub values: GridValues,
}

impl GridParameter {
    pub fn list(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: GridValues::List { values },
        }
    }

    pub fn range(name: impl Into<String>, start: f64, stop: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            values: GridValues::Range { start, stop, step },
        }
    }

    /// Materializes the swept values in order.
    pub fn expand(&self) -> Result<Vec<f64>, CrustError> {
        let values = match &self.values {
            GridValues::List { values } => values.clone(),
            GridValues::Range { start, stop, step } => {
                if !(step.is_finite() && *step > 0.0 && start.is_finite() && stop.is_finite()) {
                    return Err(CrustError::Config(
                        ErrorInfo::new("crust_exp.range_step", "range needs a positive finite step")
                            .with_context("parameter", self.name.clone())
                            .with_context("step", step.to_string()),
                    ));
                }
                let count = ((stop - start) / step).ceil().max(0.0);
                if !count.is_finite() || count > MAX_PLAN_POINTS as f64 {
                    return Err(range_size_error(&self.name, count));
                }
                (0..count as usize).map(|idx| start + idx as f64 * step).collect()
            }
        };
        if values.is_empty() {
            return Err(CrustError::Config(
                ErrorInfo::new("crust_exp.empty_parameter", "parameter expands to no values")
                    .with_context("parameter", self.name.clone()),
            ));
        }
        Ok(values)
    }
}

/// Plan describing the swept parameter space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub parameters: Vec<GridParameter>,
}

impl SweepPlan {
    /// Sweep over one parameter's explicit values.
    pub fn single(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            parameters: vec![GridParameter::list(name, values)],
        }
    }

    /// Expands the cartesian product of all parameters. The first parameter
    /// varies slowest.
    pub fn expand(&self) -> Result<Vec<ParameterSet>, CrustError> {
        if self.parameters.is_empty() {
            return Err(CrustError::Config(ErrorInfo::new(
                "crust_exp.empty_plan",
                "sweep plan declares no parameters",
            )));
        }
        let mut axes = Vec::with_capacity(self.parameters.len());
        let mut total = 1usize;
        for param in &self.parameters {
            let values = param.expand()?;
            total = total
                .checked_mul(values.len())
                .filter(|total| *total <= MAX_PLAN_POINTS)
                .ok_or_else(|| {
                    range_size_error("plan", self.parameters.len() as f64 * values.len() as f64)
                })?;
            axes.push((param.name.as_str(), values));
        }
        let mut outputs = Vec::with_capacity(total);
        expand_grid(&axes, 0, ParameterSet::new(), &mut outputs);
        Ok(outputs)
    }
}

fn expand_grid(
    axes: &[(&str, Vec<f64>)],
    idx: usize,
    current: ParameterSet,
    outputs: &mut Vec<ParameterSet>,
) {
    if idx == axes.len() {
        outputs.push(current);
        return;
    }
    let (name, values) = &axes[idx];
    for value in values {
        let next = current.clone().with(*name, *value);
        expand_grid(axes, idx + 1, next, outputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_matches_arange_length() {
        let values = GridParameter::range("yHe", 4.0, 9.1, 0.1).expand().expect("range");
        assert_eq!(values.len(), 51);
        assert_eq!(values[0], 4.0);
        let values = GridParameter::range("yHe", 5.0, 10.0, 1.0).expand().expect("range");
        assert_eq!(values, [5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn cartesian_product_keeps_declaration_order() {
        let plan = SweepPlan {
            parameters: vec![
                GridParameter::list("yHe", vec![4.0, 5.0]),
                GridParameter::list("mass", vec![1.4, 1.6, 1.8]),
            ],
        };
        let points = plan.expand().expect("expand");
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].label(), "yHe-4_mass-1.4");
        assert_eq!(points[2].label(), "yHe-4_mass-1.8");
        assert_eq!(points[3].label(), "yHe-5_mass-1.4");
    }

    #[test]
    fn rejects_degenerate_plans() {
        assert!(SweepPlan { parameters: vec![] }.expand().is_err());
        assert!(GridParameter::range("x", 0.0, 1.0, 0.0).expand().is_err());
        assert!(GridParameter::range("x", 2.0, 1.0, 1.0).expand().is_err());
        assert!(GridParameter::list("x", vec![]).expand().is_err());
    }

    #[test]
    fn oversized_ranges_are_config_errors() {
        let err = GridParameter::range("yHe", 0.0, 1.0, 1e-300)
            .expand()
            .expect_err("too many points");
        assert_eq!(err.info().code, "crust_exp.range_size");
        let err = GridParameter::range("yHe", -1e308, 1e308, 1.0)
            .expand()
            .expect_err("infinite span");
        assert_eq!(err.info().code, "crust_exp.range_size");

        let wide = GridParameter::range("x", 0.0, 2_000.0, 1.0);
        let plan = SweepPlan {
            parameters: vec![wide.clone(), wide],
        };
        let err = plan.expand().expect_err("product too large");
        assert_eq!(err.info().code, "crust_exp.range_size");
    }
}
