use crate::dense::Mat;
use crate::error::{PowerFlowError, Result};
use crate::network::{Bus, Line};

use num_complex::Complex64;
use sparsetools::coo::Coo;
use std::ops::Deref;

/// Bus admittance matrix.
///
/// Built once from the line data by [`make_ybus`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittanceMatrix {
    y: Mat<Complex64>,
}

impl AdmittanceMatrix {
    /// Returns true if `Y[i][j] == Y[j][i]` for every off-diagonal pair
    /// (within `tol`).
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.y.dim();
        (0..n).all(|i| (i + 1..n).all(|j| (self.y.get(i, j) - self.y.get(j, i)).norm() <= tol))
    }

    /// Sparse copy of the non-zero entries.
    pub fn to_coo(&self) -> Coo<usize, Complex64> {
        let n = self.y.dim();
        let mut coo = Coo::with_size(n, n);
        for i in 0..n {
            for (j, &y_ij) in self.y.row(i).iter().enumerate() {
                if y_ij != Complex64::default() {
                    coo.push(i, j, y_ij);
                }
            }
        }
        coo
    }

    pub fn to_table(&self) -> String {
        self.to_coo().to_csr().to_table()
    }
}

impl Deref for AdmittanceMatrix {
    type Target = Mat<Complex64>;

    fn deref(&self) -> &Self::Target {
        &self.y
    }
}

/// Builds the bus admittance matrix from the series impedance of each line.
///
/// Parallel lines between the same pair of buses accumulate. Bus ids must be
/// consecutive beginning at 1 (bus `id` maps to row `id - 1`).
pub fn make_ybus(bus: &[Bus], line: &[Line]) -> Result<AdmittanceMatrix> {
    let nb = bus.len();
    let mut y_bus = Mat::zeros(nb);

    for (l, ln) in line.iter().enumerate() {
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
        if f == t {
            return Err(PowerFlowError::Topology(format!(
                "line {} connects bus {} to itself",
                l + 1,
                ln.from_bus
            )));
        }
        if !(ln.r.is_finite() && ln.x.is_finite()) || ln.r < 0.0 {
            return Err(PowerFlowError::MalformedRecord {
                row: l + 1,
                reason: format!("line {}-{} needs finite X and R >= 0", ln.from_bus, ln.to_bus),
            });
        }
        let y_s = ln.admittance().ok_or(PowerFlowError::DegenerateLine {
            line: l + 1,
            from_bus: ln.from_bus,
            to_bus: ln.to_bus,
        })?; // series admittance

        y_bus.add_at(f, f, y_s);
        y_bus.add_at(t, t, y_s);
        y_bus.add_at(f, t, -y_s);
        y_bus.add_at(t, f, -y_s);
    }

    Ok(AdmittanceMatrix { y: y_bus })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buses(n: usize) -> Vec<Bus> {
        (1..=n).map(|id| Bus::pq(id, 0.0, 0.0)).collect()
    }

    #[test]
    fn three_bus_ybus() {
        let lines = vec![
            Line::new(1, 2, 0.01, 0.1),
            Line::new(2, 3, 0.01, 0.1),
            Line::new(1, 3, 0.01, 0.1),
        ];
        let y_bus = make_ybus(&buses(3), &lines).unwrap();
        let y = Complex64::new(1.0, 0.0) / Complex64::new(0.01, 0.1);

        for i in 0..3 {
            assert!((y_bus.get(i, i) - 2.0 * y).norm() < 1e-12);
            for j in 0..3 {
                if i != j {
                    assert!((y_bus.get(i, j) + y).norm() < 1e-12);
                }
            }
        }
        assert!(y_bus.is_symmetric(0.0));
    }

    #[test]
    fn parallel_lines_accumulate() {
        let lines = vec![Line::new(1, 2, 0.0, 0.2), Line::new(2, 1, 0.0, 0.2)];
        let y_bus = make_ybus(&buses(2), &lines).unwrap();

        assert!((y_bus.get(0, 1) - Complex64::new(0.0, 10.0)).norm() < 1e-12);
        assert!((y_bus.get(0, 0) - Complex64::new(0.0, -10.0)).norm() < 1e-12);
        assert_eq!(y_bus.get(0, 1), y_bus.get(1, 0));
    }

    #[test]
    fn unconnected_pair_is_zero() {
        let lines = vec![Line::new(1, 2, 0.01, 0.1), Line::new(2, 3, 0.01, 0.1)];
        let y_bus = make_ybus(&buses(3), &lines).unwrap();
        assert_eq!(y_bus.get(0, 2), Complex64::default());
        assert_eq!(y_bus.get(2, 0), Complex64::default());
    }

    #[test]
    fn unknown_bus() {
        let err = make_ybus(&buses(2), &[Line::new(1, 3, 0.01, 0.1)]).unwrap_err();
        assert!(matches!(err, PowerFlowError::Topology(_)));

        let err = make_ybus(&buses(2), &[Line::new(0, 2, 0.01, 0.1)]).unwrap_err();
        assert!(matches!(err, PowerFlowError::Topology(_)));

        let err = make_ybus(&buses(2), &[Line::new(2, 2, 0.01, 0.1)]).unwrap_err();
        assert!(matches!(err, PowerFlowError::Topology(_)));
    }

    #[test]
    fn zero_impedance() {
        let err = make_ybus(&buses(2), &[Line::new(1, 2, 0.0, 0.0)]).unwrap_err();
        assert!(matches!(
            err,
            PowerFlowError::DegenerateLine {
                line: 1,
                from_bus: 1,
                to_bus: 2
            }
        ));
    }

    #[test]
    fn negative_resistance() {
        let err = make_ybus(&buses(2), &[Line::new(1, 2, -0.01, 0.1)]).unwrap_err();
        assert!(matches!(err, PowerFlowError::MalformedRecord { row: 1, .. }));
    }
}
