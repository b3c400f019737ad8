use crate::error::{PowerFlowError, Result};
use crate::network::Line;

use num_complex::Complex64;

/// Flow on a single line, oriented from `from_bus` to `to_bus`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineResult {
    pub from_bus: usize,
    pub to_bus: usize,
    /// Series current flowing from `from_bus` towards `to_bus`.
    pub current: Complex64,
    /// Real power loss `|I|^2 R`.
    pub power_loss: f64,
    /// Reactive power consumed by the series reactance `|I|^2 X`.
    pub reactive_loss: f64,
    /// Complex power entering the line at the "from" end.
    pub s_from: Complex64,
    /// Complex power entering the line at the "to" end.
    pub s_to: Complex64,
}

/// Computes the current, losses and terminal power of each line from the
/// bus voltages. One result per line, in input order.
pub fn analyze(v: &[Complex64], line: &[Line]) -> Result<Vec<LineResult>> {
    let nb = v.len();
    line.iter()
        .enumerate()
        .map(|(l, ln)| {
            let index = |id: usize| {
                if id >= 1 && id <= nb {
                    Ok(id - 1)
                } else {
                    Err(PowerFlowError::Topology(format!(
                        "line {} references unknown bus {}",
                        l + 1,
                        id
                    )))
                }
            };
            let (f, t) = (index(ln.from_bus)?, index(ln.to_bus)?);

            let z = ln.impedance();
            if z.norm_sqr() == 0.0 {
                return Err(PowerFlowError::DegenerateLine {
                    line: l + 1,
                    from_bus: ln.from_bus,
                    to_bus: ln.to_bus,
                });
            }

            let current = (v[f] - v[t]) / z;
            let i2 = current.norm_sqr();

            Ok(LineResult {
                from_bus: ln.from_bus,
                to_bus: ln.to_bus,
                current,
                power_loss: i2 * ln.r,
                reactive_loss: i2 * ln.x,
                s_from: v[f] * current.conj(),
                s_to: -v[t] * current.conj(),
            })
        })
        .collect()
}
