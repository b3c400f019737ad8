mod case;
mod dense;
mod dsbus_dv;
mod error;
mod jac;
mod lineflow;
mod mismatch;
mod network;
mod newton;
mod pfopt;
mod pfsoln;
mod report;
mod runpf;
mod ybus;

pub mod debug;

pub use case::*;
pub use dense::*;
pub use dsbus_dv::*;
pub use error::*;
pub use jac::*;
pub use lineflow::*;
pub use mismatch::*;
pub use network::*;
pub use newton::*;
pub use pfopt::*;
pub use pfsoln::*;
pub use report::*;
pub use runpf::*;
pub use ybus::*;
