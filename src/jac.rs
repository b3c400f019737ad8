use crate::dense::Mat;
use crate::dsbus_dv::d_sbus_d_v;
use crate::error::{PowerFlowError, Result};

use num_complex::Complex64;
use sparsetools::coo::Coo;
use sparsetools::csc::CSC;

/// Forms the reduced power flow Jacobian.
///
/// Rows are the real power equations at the PV and PQ buses followed by the
/// reactive power equations at the PQ buses. Columns are the voltage angles
/// of the PV and PQ buses followed by the voltage magnitudes of the PQ
/// buses. The slack bus does not appear. Angles are in radians.
///
/// ```text
///     | dP/dVa  dP/dVm |   | J11  J12 |
/// J = |                | = |          |
///     | dQ/dVa  dQ/dVm |   | J21  J22 |
/// ```
///
/// A Jacobian with an all-zero row or column is structurally singular and
/// is rejected with `IllConditionedSystem`.
pub fn make_jac(
    y_bus: &Mat<Complex64>,
    v: &[Complex64],
    pv: &[usize],
    pq: &[usize],
) -> Result<CSC<usize, f64>> {
    let pv_pq = [pv, pq].concat();
    let (npvpq, npq) = (pv_pq.len(), pq.len());
    let n = npvpq + npq;

    let (d_sbus_d_va, d_sbus_d_vm) = d_sbus_d_v(y_bus, v);
    let (j11, j21) = (d_sbus_d_va.real(), d_sbus_d_va.imag());
    let (j12, j22) = (d_sbus_d_vm.real(), d_sbus_d_vm.imag());

    let mut jac = Coo::with_size(n, n);
    let mut row_nnz = vec![0; n];
    let mut col_nnz = vec![0; n];
    let mut push = |r: usize, c: usize, value: f64| {
        if value != 0.0 {
            jac.push(r, c, value);
            row_nnz[r] += 1;
            col_nnz[c] += 1;
        }
    };

    for (r, &i) in pv_pq.iter().enumerate() {
        for (c, &k) in pv_pq.iter().enumerate() {
            push(r, c, j11.get(i, k));
        }
        for (c, &k) in pq.iter().enumerate() {
            push(r, npvpq + c, j12.get(i, k));
        }
    }
    for (r, &i) in pq.iter().enumerate() {
        for (c, &k) in pv_pq.iter().enumerate() {
            push(npvpq + r, c, j21.get(i, k));
        }
        for (c, &k) in pq.iter().enumerate() {
            push(npvpq + r, npvpq + c, j22.get(i, k));
        }
    }

    if let Some(r) = row_nnz.iter().position(|&nnz| nnz == 0) {
        return Err(PowerFlowError::IllConditionedSystem(format!(
            "Jacobian row {} is zero",
            r
        )));
    }
    if let Some(c) = col_nnz.iter().position(|&nnz| nnz == 0) {
        return Err(PowerFlowError::IllConditionedSystem(format!(
            "Jacobian column {} is zero",
            c
        )));
    }

    let jac = jac.to_csc();
    log::trace!("J:\n{}", jac.to_csr().to_table());

    Ok(jac)
}
