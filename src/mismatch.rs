use crate::dense::Mat;
use crate::error::{PowerFlowError, Result};
use crate::network::Bus;

use full::slice::norm_inf;
use itertools::izip;
use num_complex::Complex64;

/// Power mismatch at every bus for one voltage state.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Calculated complex power injection `V * conj(Ybus * V)`.
    pub s_calc: Vec<Complex64>,
    /// Specified minus calculated real power.
    pub dp: Vec<f64>,
    /// Specified minus calculated reactive power.
    pub dq: Vec<f64>,
}

impl Mismatch {
    /// Stacks the mismatches solved for by Newton's method: real power at
    /// the PV and PQ buses followed by reactive power at the PQ buses.
    pub fn f(&self, pv_pq: &[usize], pq: &[usize]) -> Vec<f64> {
        pv_pq
            .iter()
            .map(|&i| self.dp[i])
            .chain(pq.iter().map(|&i| self.dq[i]))
            .collect()
    }

    /// Largest absolute entry of [`Mismatch::f`], zero if nothing is solved for.
    pub fn norm(&self, pv_pq: &[usize], pq: &[usize]) -> f64 {
        let f = self.f(pv_pq, pq);
        if f.is_empty() {
            0.0
        } else {
            norm_inf(&f)
        }
    }
}

/// Evaluates the specified minus calculated power injection at each bus.
///
/// `v`, `bus` and `y_bus` must all cover the same buses, otherwise a
/// `Topology` error is returned.
pub fn evaluate(v: &[Complex64], y_bus: &Mat<Complex64>, bus: &[Bus]) -> Result<Mismatch> {
    let n = y_bus.dim();
    if v.len() != n || bus.len() != n {
        return Err(PowerFlowError::Topology(format!(
            "{} buses and {} voltages for a {}x{} admittance matrix",
            bus.len(),
            v.len(),
            n,
            n
        )));
    }

    let i_bus = y_bus * v;
    let s_calc: Vec<Complex64> = izip!(v, &i_bus)
        .map(|(v, i_bus)| v * i_bus.conj())
        .collect();

    let (dp, dq) = izip!(bus, &s_calc)
        .map(|(b, s)| (b.p - s.re, b.q - s.im))
        .unzip();

    Ok(Mismatch { s_calc, dp, dq })
}
