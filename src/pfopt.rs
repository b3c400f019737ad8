use crate::error::{PowerFlowError, Result};

use clap::ValueEnum;

/// Starting point for the Newton iterations.
#[derive(Debug, PartialEq, Copy, Clone, Default, ValueEnum)]
pub enum VoltageInit {
    /// Use the voltage magnitude and angle given with each bus.
    #[default]
    Case,
    /// 1.0 p.u. at 0 degrees for PQ buses and 0 degrees for PV buses.
    /// PV set-points and the slack voltage are kept.
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PFOpt {
    // Termination tolerance on per unit P & Q mismatch. Default value is 1e-6.
    pub tolerance: f64,

    // Maximum number of iterations for Newton's method. Default value is 10.
    pub max_it: usize,

    pub init: VoltageInit,
}

impl Default for PFOpt {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_it: 10,
            init: VoltageInit::Case,
        }
    }
}

impl PFOpt {
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn max_it(mut self, max_it: usize) -> Self {
        self.max_it = max_it;
        self
    }

    pub fn init(mut self, init: VoltageInit) -> Self {
        self.init = init;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PowerFlowError::InvalidOption(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_it == 0 {
            return Err(PowerFlowError::InvalidOption(
                "maximum iterations must be positive".into(),
            ));
        }
        Ok(())
    }
}
