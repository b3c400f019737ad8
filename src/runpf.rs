use crate::debug::format_polar_vec;
use crate::error::Result;
use crate::lineflow::analyze;
use crate::network::{BusType, Network};
use crate::newton::{newtonpf, ProgressMonitor};
use crate::pfopt::{PFOpt, VoltageInit};
use crate::pfsoln::{pfsoln, PowerFlowSolution};

use num_complex::Complex64;
use spsolve::Solver;
use std::time::Instant;

/// Initial complex bus voltages for the Newton iterations.
pub fn initial_voltage(network: &Network, init: VoltageInit) -> Vec<Complex64> {
    network
        .buses()
        .iter()
        .map(|b| match (init, b.bus_type) {
            (VoltageInit::Case, _) | (VoltageInit::Flat, BusType::Slack) => b.v0(),
            (VoltageInit::Flat, BusType::PV) => Complex64::new(b.vm, 0.0),
            (VoltageInit::Flat, BusType::PQ) => Complex64::new(1.0, 0.0),
        })
        .collect()
}

/// Runs a load flow.
///
/// Solves for the bus voltages with Newton's method and derives the bus
/// injections and line flows from the final voltages. A run that hits the
/// iteration limit still returns a solution, with
/// [`crate::Convergence::MaxIterExceeded`].
pub fn runpf(
    network: &Network,
    opt: &PFOpt,
    solver: &dyn Solver<usize, f64>,
    progress: Option<&dyn ProgressMonitor>,
) -> Result<PowerFlowSolution> {
    opt.validate()?;

    // get bus index lists of each type of bus
    let (_ref, pv, pq) = network.bus_types();

    //-----  run the power flow  -----
    let t0 = Instant::now();

    let v0 = initial_voltage(network, opt.init);
    log::debug!("V0: {}", format_polar_vec(&v0));

    let newton = newtonpf(
        network.y_bus(),
        network.buses(),
        &v0,
        &pv,
        &pq,
        solver,
        opt,
        progress,
    )?;
    log::info!("Power flow solved in {:?}", t0.elapsed());

    let lines = analyze(&newton.v, network.lines())?;

    Ok(pfsoln(network.buses(), newton, lines))
}

/// Runs a load flow without progress reporting.
pub fn solve(
    network: &Network,
    opt: &PFOpt,
    solver: &dyn Solver<usize, f64>,
) -> Result<PowerFlowSolution> {
    runpf(network, opt, solver, None)
}
