use crate::debug::{format_f64_vec, format_polar_vec};
use crate::dense::Mat;
use crate::error::{PowerFlowError, Result};
use crate::jac::make_jac;
use crate::mismatch::{evaluate, Mismatch};
use crate::network::Bus;
use crate::newton::ProgressMonitor;
use crate::pfopt::PFOpt;

use num_complex::Complex64;
use spsolve::Solver;
use std::iter::zip;

/// State of the Newton iterations when they stopped.
#[derive(Debug, Clone)]
pub struct NewtonSolution {
    /// Final complex bus voltages.
    pub v: Vec<Complex64>,
    /// Mismatch evaluated at `v`.
    pub mismatch: Mismatch,
    /// Largest |dP| (PV and PQ buses) or |dQ| (PQ buses) at `v`.
    pub norm_f: f64,
    pub converged: bool,
    /// Number of Jacobian updates performed.
    pub iterations: usize,
}

/// Solves power flow using full Newton's method (power/polar).
///
/// Solves for bus voltages using a full Newton-Raphson method, using nodal
/// power balance equations and polar coordinate representation of
/// voltages.
///
/// The bus voltage vector contains the set point for PV and slack buses,
/// and the reference angle of the slack bus, as well as an initial guess
/// for remaining magnitudes and angles. The slack bus voltage is never
/// updated, PV buses only have their angle updated.
///
/// Reaching the iteration limit is not an error: the last iterate is
/// returned with `converged` set to false. `v0` and `bus` must match the
/// dimension of `y_bus` and `pv`/`pq` must index into them.
pub fn newtonpf(
    y_bus: &Mat<Complex64>,
    bus: &[Bus],
    v0: &[Complex64],
    pv: &[usize],
    pq: &[usize],
    solver: &dyn Solver<usize, f64>,
    opt: &PFOpt,
    progress: Option<&dyn ProgressMonitor>,
) -> Result<NewtonSolution> {
    opt.validate()?;
    let n = y_bus.dim();
    if v0.len() != n || bus.len() != n {
        return Err(PowerFlowError::Topology(format!(
            "{} buses and {} initial voltages for a {}x{} admittance matrix",
            bus.len(),
            v0.len(),
            n,
            n
        )));
    }
    let pv_pq = [pv, pq].concat();
    if let Some(&k) = pv_pq.iter().find(|&&k| k >= n) {
        return Err(PowerFlowError::Topology(format!(
            "bus index {} out of range for {} buses",
            k, n
        )));
    }

    let tol = opt.tolerance;
    let max_it = opt.max_it;

    let mut converged = false;
    let mut i = 0;
    let mut v: Vec<Complex64> = v0.to_vec();
    let mut va: Vec<f64> = v.iter().map(|v| v.arg()).collect();
    let mut vm: Vec<f64> = v.iter().map(|v| v.norm()).collect();

    // set up indexing for updating V
    let npv = pv.len();
    let npq = pq.len();
    let (j1, j2) = (0, npv); // j1:j2 - V angle of pv buses
    let (j3, j4) = (j2, j2 + npq); // j3:j4 - V angle of pq buses
    let (j5, j6) = (j4, j4 + npq); // j5:j6 - V mag of pq buses

    // evaluate F(x0)
    let mut mis = evaluate(&v, y_bus, bus)?;
    let mut norm_f = mis.norm(&pv_pq, pq);

    // check tolerance
    if let Some(pm) = progress {
        pm.update(i, norm_f);
    }
    if norm_f < tol {
        converged = true;
        log::info!("Converged!");
    }
    log::debug!("norm_f0: {}", norm_f);

    // do Newton iterations
    while !converged && i < max_it {
        // update iteration counter
        i += 1;

        // evaluate Jacobian
        let jac = make_jac(y_bus, &v, pv, pq)?;

        // compute update step, J * dx = [dP; dQ]
        let dx = {
            let mut rhs = mis.f(&pv_pq, pq);
            log::trace!("dS: {}", format_f64_vec(&rhs));
            solver
                .solve(
                    jac.cols(),
                    jac.rowidx(),
                    jac.colptr(),
                    jac.values(),
                    &mut rhs,
                    false,
                )
                .map_err(|err| PowerFlowError::IllConditionedSystem(err.to_string()))?;
            rhs
        };
        log::trace!("dx: {}", format_f64_vec(&dx));
        if dx.iter().any(|dx| !dx.is_finite()) {
            return Err(PowerFlowError::IllConditionedSystem(format!(
                "non-finite update step in iteration {}",
                i
            )));
        }

        // update voltage
        for (i, j) in (j1..j2).enumerate() {
            va[pv[i]] += dx[j];
        }
        for (i, j) in (j3..j4).enumerate() {
            va[pq[i]] += dx[j];
        }
        for (i, j) in (j5..j6).enumerate() {
            vm[pq[i]] += dx[j];
        }

        // update Vm and Va again in case we wrapped around with a negative Vm
        v = zip(&vm, &va)
            .map(|(&vm, &va)| Complex64::from_polar(vm, va))
            .collect();
        va = v.iter().map(|v| v.arg()).collect();
        vm = v.iter().map(|v| v.norm()).collect();
        log::debug!("V_{}: {}", i, format_polar_vec(&v));

        if let Some(k) = vm.iter().position(|&vm| vm == 0.0) {
            return Err(PowerFlowError::IllConditionedSystem(format!(
                "voltage at bus {} collapsed to zero in iteration {}",
                k + 1,
                i
            )));
        }

        // evaluate F(x)
        mis = evaluate(&v, y_bus, bus)?;
        norm_f = mis.norm(&pv_pq, pq);

        // check for convergence
        if let Some(pm) = progress {
            pm.update(i, norm_f);
        }
        if norm_f < tol {
            converged = true;
            log::info!(
                "Newton's method power flow (power balance, polar) converged in {} iterations.",
                i
            );
        }
        log::debug!("norm_f{}: {}", i, norm_f);
    }

    if !converged {
        log::info!(
            "Newton's method power flow (power balance, polar) did not converge in {} iterations.",
            i
        );
    }

    Ok(NewtonSolution {
        v,
        mismatch: mis,
        norm_f,
        converged,
        iterations: i,
    })
}
