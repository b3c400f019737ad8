mod power;

pub use power::*;

/// Receives the largest power mismatch after every evaluation; iteration 0
/// is the initial point.
pub trait ProgressMonitor {
    fn update(&self, i: usize, norm_f: f64);
}

/// Logs each iteration's mismatch at `info` level.
pub struct LogProgress {}

impl ProgressMonitor for LogProgress {
    fn update(&self, i: usize, norm_f: f64) {
        if i == 0 {
            log::info!(" it    max P & Q mismatch (p.u.)");
            log::info!("----  ---------------------------");
        }
        log::info!("{:3}        {:10.3e}", i, norm_f);
    }
}
