use crate::lineflow::LineResult;
use crate::network::{Bus, BusType};
use crate::newton::NewtonSolution;

use num_complex::Complex64;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Convergence {
    Converged,
    /// The iteration limit was reached before the mismatch tolerance.
    MaxIterExceeded,
}

/// Solved state of one bus.
#[derive(Debug, Clone, PartialEq)]
pub struct BusResult {
    pub id: usize,
    pub bus_type: BusType,
    /// Voltage magnitude (p.u.).
    pub vm: f64,
    /// Voltage angle (degrees).
    pub va: f64,
    /// Calculated real power injection.
    pub p: f64,
    /// Calculated reactive power injection.
    pub q: f64,
    /// Specified minus calculated real power, not solved for at the slack bus.
    pub dp: f64,
    /// Specified minus calculated reactive power, only solved for at PQ buses.
    pub dq: f64,
}

/// Result of a load flow run.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerFlowSolution {
    pub convergence: Convergence,
    pub iterations: usize,
    /// Largest P or Q mismatch over the buses that were solved for.
    pub max_mismatch: f64,
    /// Complex bus voltages, angles in radians.
    pub voltage: Vec<Complex64>,
    pub buses: Vec<BusResult>,
    pub lines: Vec<LineResult>,
}

impl PowerFlowSolution {
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }

    /// Total real power loss over all lines.
    pub fn total_loss(&self) -> f64 {
        self.lines.iter().map(|ln| ln.power_loss).sum()
    }

    pub fn slack(&self) -> Option<&BusResult> {
        self.buses.iter().find(|b| b.bus_type == BusType::Slack)
    }
}

/// Collects the Newton result and line flows into a `PowerFlowSolution`.
///
/// Voltages are converted to magnitude and angle in degrees. The calculated
/// injection is reported at every bus, which gives the slack bus real and
/// reactive output and the PV bus reactive output. Mismatches are reported
/// for every bus but only those of the solved quantities (P at PV and PQ
/// buses, Q at PQ buses) are driven to zero.
pub fn pfsoln(bus: &[Bus], newton: NewtonSolution, lines: Vec<LineResult>) -> PowerFlowSolution {
    let NewtonSolution {
        v,
        mismatch,
        norm_f,
        converged,
        iterations,
    } = newton;

    let buses = bus
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let s = mismatch.s_calc[i];
            BusResult {
                id: b.id,
                bus_type: b.bus_type,
                vm: v[i].norm(),
                va: v[i].arg().to_degrees(),
                p: s.re,
                q: s.im,
                dp: mismatch.dp[i],
                dq: mismatch.dq[i],
            }
        })
        .collect();

    PowerFlowSolution {
        convergence: if converged {
            Convergence::Converged
        } else {
            Convergence::MaxIterExceeded
        },
        iterations,
        max_mismatch: norm_f,
        voltage: v,
        buses,
        lines,
    }
}
