use crate::error::{PowerFlowError, Result};
use crate::network::{Bus, BusType, Line, Network};

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Reads bus records with columns `id, p, q[, vm, va[, type]]`.
///
/// The first row is a header and is skipped. `va` is in degrees. Missing
/// `vm` and `va` default to 1.0 and 0. If no row gives a bus type, bus 1 is
/// the slack bus and every other bus is PQ.
pub fn read_buses<R: Read>(rdr: R) -> Result<Vec<Bus>> {
    let mut typed = false;
    let mut bus = Vec::new();

    for (i, record) in reader(rdr).records().enumerate() {
        let record = record?;
        let row = i + 1;

        let id: usize = field(&record, 0, row, "id")?;
        let p: f64 = field(&record, 1, row, "p")?;
        let q: f64 = field(&record, 2, row, "q")?;
        let vm: f64 = optional(&record, 3, row, "vm")?.unwrap_or(1.0);
        let va: f64 = optional(&record, 4, row, "va")?.unwrap_or(0.0);
        let bus_type: Option<BusType> = optional(&record, 5, row, "type")?;
        typed |= bus_type.is_some();

        if vm <= 0.0 {
            return Err(malformed(row, "vm must be positive"));
        }
        bus.push(Bus::new(id, bus_type.unwrap_or_default(), p, q).with_voltage(vm, va));
    }

    if !typed {
        for b in bus.iter_mut().filter(|b| b.id == 1) {
            b.bus_type = BusType::Slack;
        }
    }
    Ok(bus)
}

/// Reads line records with columns `from, to, r, x`.
pub fn read_lines<R: Read>(rdr: R) -> Result<Vec<Line>> {
    reader(rdr)
        .records()
        .enumerate()
        .map(|(i, record)| {
            let record = record?;
            let row = i + 1;

            let line = Line::new(
                field(&record, 0, row, "from")?,
                field(&record, 1, row, "to")?,
                field(&record, 2, row, "r")?,
                field(&record, 3, row, "x")?,
            );
            if line.r < 0.0 {
                return Err(malformed(row, "r must not be negative"));
            }
            Ok(line)
        })
        .collect()
}

pub fn load_network(bus_path: &Path, line_path: &Path) -> Result<Network> {
    let bus = read_buses(std::fs::File::open(bus_path)?)?;
    let line = read_lines(std::fs::File::open(line_path)?)?;
    log::debug!(
        "Loaded {} buses from {} and {} lines from {}",
        bus.len(),
        bus_path.display(),
        line.len(),
        line_path.display()
    );
    Network::new(bus, line)
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(rdr)
}

fn malformed(row: usize, reason: impl Into<String>) -> PowerFlowError {
    PowerFlowError::MalformedRecord {
        row,
        reason: reason.into(),
    }
}

/// Parses an optional column, empty or absent fields give `None`.
fn optional<T>(record: &StringRecord, col: usize, row: usize, name: &str) -> Result<Option<T>>
where
    T: Finite + FromStr,
    T::Err: std::fmt::Display,
{
    match record.get(col) {
        None | Some("") => Ok(None),
        Some(s) => {
            let value = s
                .parse::<T>()
                .map_err(|err| malformed(row, format!("{} {:?}: {}", name, s, err)))?;
            if !value.is_finite() {
                return Err(malformed(row, format!("{} is not finite", name)));
            }
            Ok(Some(value))
        }
    }
}

fn field<T>(record: &StringRecord, col: usize, row: usize, name: &str) -> Result<T>
where
    T: Finite + FromStr,
    T::Err: std::fmt::Display,
{
    optional(record, col, row, name)?.ok_or_else(|| malformed(row, format!("missing {}", name)))
}

trait Finite {
    fn is_finite(&self) -> bool {
        true
    }
}

impl Finite for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Finite for usize {}

impl Finite for BusType {}
