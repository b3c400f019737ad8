use crate::pfsoln::PowerFlowSolution;

use std::io::{self, Write};

/// Writes a plain text summary of a load flow solution.
pub fn write_report<W: Write>(w: &mut W, soln: &PowerFlowSolution) -> io::Result<()> {
    if soln.converged() {
        writeln!(w, "Converged in {} iterations.", soln.iterations)?;
    } else {
        writeln!(
            w,
            "Did not converge in {} iterations (max mismatch {:.3e}).",
            soln.iterations, soln.max_mismatch
        )?;
    }

    writeln!(w, "\nBus Voltages:")?;
    for b in &soln.buses {
        writeln!(
            w,
            "Bus {} ({}): {:.4} \u{2220} {:.2}\u{00B0}",
            b.id, b.bus_type, b.vm, b.va
        )?;
    }

    writeln!(w, "\nBus Injections:")?;
    for b in &soln.buses {
        writeln!(w, "Bus {}: P = {:.4}, Q = {:.4}", b.id, b.p, b.q)?;
    }

    writeln!(w, "\nPower Mismatches:")?;
    for b in &soln.buses {
        writeln!(w, "Bus {}: dP = {:.4e}, dQ = {:.4e}", b.id, b.dp, b.dq)?;
    }

    writeln!(w, "\nLine Flows:")?;
    for (i, ln) in soln.lines.iter().enumerate() {
        writeln!(
            w,
            "Line {} ({}-{}): I = {:.4} \u{2220} {:.2}\u{00B0}, Loss = {:.6}, Pf = {:.4}, Qf = {:.4}, Pt = {:.4}, Qt = {:.4}",
            i + 1,
            ln.from_bus,
            ln.to_bus,
            ln.current.norm(),
            ln.current.arg().to_degrees(),
            ln.power_loss,
            ln.s_from.re,
            ln.s_from.im,
            ln.s_to.re,
            ln.s_to.im,
        )?;
    }
    writeln!(w, "\nTotal Loss: {:.6}", soln.total_loss())?;

    Ok(())
}
