use crate::error::{PowerFlowError, Result};
use crate::ybus::{make_ybus, AdmittanceMatrix};

use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum BusType {
    /// Reference bus with fixed voltage magnitude and angle.
    Slack,
    /// Fixed real power and voltage magnitude.
    PV,
    /// Fixed real and reactive power.
    #[default]
    PQ,
}

impl FromStr for BusType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slack" | "ref" | "swing" | "3" => Ok(BusType::Slack),
            "pv" | "2" => Ok(BusType::PV),
            "pq" | "1" => Ok(BusType::PQ),
            other => Err(format!("unknown bus type {:?}", other)),
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusType::Slack => write!(f, "slack"),
            BusType::PV => write!(f, "pv"),
            BusType::PQ => write!(f, "pq"),
        }
    }
}

/// A network node.
///
/// `p` and `q` are the specified net injections (generation positive) in
/// per-unit. `vm` is the initial guess, or the set-point for slack and PV
/// buses. `va` is in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub id: usize,
    pub bus_type: BusType,
    pub p: f64,
    pub q: f64,
    pub vm: f64,
    pub va: f64,
}

impl Bus {
    pub fn new(id: usize, bus_type: BusType, p: f64, q: f64) -> Self {
        Self {
            id,
            bus_type,
            p,
            q,
            vm: 1.0,
            va: 0.0,
        }
    }

    pub fn slack(id: usize, vm: f64, va: f64) -> Self {
        Self::new(id, BusType::Slack, 0.0, 0.0).with_voltage(vm, va)
    }

    pub fn pv(id: usize, p: f64, vm: f64) -> Self {
        Self::new(id, BusType::PV, p, 0.0).with_voltage(vm, 0.0)
    }

    pub fn pq(id: usize, p: f64, q: f64) -> Self {
        Self::new(id, BusType::PQ, p, q)
    }

    pub fn with_voltage(mut self, vm: f64, va: f64) -> Self {
        self.vm = vm;
        self.va = va;
        self
    }

    pub fn is_slack(&self) -> bool {
        self.bus_type == BusType::Slack
    }

    pub fn is_pv(&self) -> bool {
        self.bus_type == BusType::PV
    }

    pub fn is_pq(&self) -> bool {
        self.bus_type == BusType::PQ
    }

    /// Specified complex power injection.
    pub fn s_spec(&self) -> Complex64 {
        Complex64::new(self.p, self.q)
    }

    /// Voltage phasor from the record (angle converted to radians).
    pub fn v0(&self) -> Complex64 {
        Complex64::from_polar(self.vm, self.va.to_radians())
    }
}

/// A series R + jX branch between two buses.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub from_bus: usize,
    pub to_bus: usize,
    pub r: f64,
    pub x: f64,
}

impl Line {
    pub fn new(from_bus: usize, to_bus: usize, r: f64, x: f64) -> Self {
        Self {
            from_bus,
            to_bus,
            r,
            x,
        }
    }

    pub fn impedance(&self) -> Complex64 {
        Complex64::new(self.r, self.x)
    }

    /// Series admittance `1 / (R + jX)`, `None` if the impedance is zero.
    pub fn admittance(&self) -> Option<Complex64> {
        let z = self.impedance();
        if z.norm_sqr() > 0.0 {
            Some(Complex64::new(1.0, 0.0) / z)
        } else {
            None
        }
    }
}

/// Validated buses and lines together with their admittance matrix.
///
/// Buses are held in id order so that bus `id` is at index `id - 1`.
#[derive(Debug, Clone)]
pub struct Network {
    buses: Vec<Bus>,
    lines: Vec<Line>,
    y_bus: AdmittanceMatrix,
    slack: usize,
}

impl Network {
    pub fn new(mut buses: Vec<Bus>, lines: Vec<Line>) -> Result<Self> {
        if buses.is_empty() {
            return Err(PowerFlowError::Topology("network has no buses".into()));
        }
        for (i, b) in buses.iter().enumerate() {
            if !(b.p.is_finite() && b.q.is_finite() && b.vm.is_finite() && b.va.is_finite()) {
                return Err(PowerFlowError::MalformedRecord {
                    row: i + 1,
                    reason: format!("bus {} has a non-finite value", b.id),
                });
            }
            if b.vm <= 0.0 {
                return Err(PowerFlowError::MalformedRecord {
                    row: i + 1,
                    reason: format!("bus {} voltage magnitude must be positive", b.id),
                });
            }
        }

        buses.sort_by_key(|b| b.id);
        for (i, b) in buses.iter().enumerate() {
            if b.id != i + 1 {
                return Err(PowerFlowError::Topology(format!(
                    "bus ids must be unique and contiguous from 1, found {} at position {}",
                    b.id,
                    i + 1
                )));
            }
        }

        let slack: Vec<usize> = buses
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_slack())
            .map(|(i, _)| i)
            .collect();
        let slack = match slack.as_slice() {
            [i] => *i,
            [] => return Err(PowerFlowError::Topology("no slack bus".into())),
            _ => {
                return Err(PowerFlowError::Topology(format!(
                    "{} slack buses, expected exactly one",
                    slack.len()
                )))
            }
        };

        let y_bus = make_ybus(&buses, &lines)?;
        log::trace!("Ybus:\n{}", y_bus.to_table());

        Ok(Self {
            buses,
            lines,
            y_bus,
            slack,
        })
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn y_bus(&self) -> &AdmittanceMatrix {
        &self.y_bus
    }

    /// Index of the slack bus.
    pub fn slack(&self) -> usize {
        self.slack
    }

    pub fn len(&self) -> usize {
        self.buses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }

    /// Index lists of the (slack, PV, PQ) buses.
    pub fn bus_types(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        bus_types(&self.buses)
    }
}

/// Builds index lists for each type of bus (slack, PV, PQ).
///
/// Expects buses to be in internal order (bus at index `i` has id `i + 1`).
pub fn bus_types(bus: &[Bus]) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let of_type = |t: BusType| {
        bus.iter()
            .enumerate()
            .filter(|(_, b)| b.bus_type == t)
            .map(|(i, _)| i)
            .collect::<Vec<usize>>()
    };
    (
        of_type(BusType::Slack),
        of_type(BusType::PV),
        of_type(BusType::PQ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<Line> {
        vec![Line::new(1, 2, 0.01, 0.1), Line::new(2, 3, 0.01, 0.1)]
    }

    #[test]
    fn buses_are_reordered_by_id() {
        let net = Network::new(
            vec![Bus::pq(3, -0.2, -0.1), Bus::slack(1, 1.0, 0.0), Bus::pq(2, -0.5, -0.2)],
            lines(),
        )
        .unwrap();
        let ids: Vec<usize> = net.buses().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(net.slack(), 0);
        assert_eq!(net.bus_types(), (vec![0], vec![], vec![1, 2]));
    }

    #[test]
    fn exactly_one_slack() {
        let none = Network::new(vec![Bus::pq(1, 0.0, 0.0), Bus::pq(2, 0.0, 0.0)], vec![]);
        assert!(matches!(none, Err(PowerFlowError::Topology(_))));

        let two = Network::new(
            vec![Bus::slack(1, 1.0, 0.0), Bus::slack(2, 1.0, 0.0)],
            vec![Line::new(1, 2, 0.0, 0.1)],
        );
        assert!(matches!(two, Err(PowerFlowError::Topology(_))));
    }

    #[test]
    fn ids_must_be_contiguous() {
        let gap = Network::new(
            vec![Bus::slack(1, 1.0, 0.0), Bus::pq(3, 0.0, 0.0)],
            vec![Line::new(1, 3, 0.0, 0.1)],
        );
        assert!(matches!(gap, Err(PowerFlowError::Topology(_))));

        let dup = Network::new(
            vec![Bus::slack(1, 1.0, 0.0), Bus::pq(1, 0.0, 0.0)],
            vec![],
        );
        assert!(matches!(dup, Err(PowerFlowError::Topology(_))));
    }

    #[test]
    fn rejects_non_finite_values() {
        let net = Network::new(
            vec![Bus::slack(1, 1.0, 0.0), Bus::pq(2, f64::NAN, 0.0)],
            vec![Line::new(1, 2, 0.0, 0.1)],
        );
        assert!(matches!(net, Err(PowerFlowError::MalformedRecord { row: 2, .. })));
    }

    #[test]
    fn parse_bus_type() {
        assert_eq!("Slack".parse::<BusType>(), Ok(BusType::Slack));
        assert_eq!(" ref ".parse::<BusType>(), Ok(BusType::Slack));
        assert_eq!("PV".parse::<BusType>(), Ok(BusType::PV));
        assert_eq!("1".parse::<BusType>(), Ok(BusType::PQ));
        assert!("load".parse::<BusType>().is_err());
    }

    #[test]
    fn zero_impedance_admittance() {
        assert!(Line::new(1, 2, 0.0, 0.0).admittance().is_none());
        let y = Line::new(1, 2, 0.0, 0.5).admittance().unwrap();
        assert!((y - Complex64::new(0.0, -2.0)).norm() < 1e-15);
    }
}
