use crate::dense::Mat;

use num_complex::Complex64;

/// Computes partial derivatives of power injection w.r.t. voltage.
///
/// Returns two matrices containing partial derivatives of the complex bus
/// power injections w.r.t voltage angle and voltage magnitude respectively
/// (for all buses):
///
/// ```text
/// dS/dVa = j diag(V) conj(diag(Ibus) - Ybus diag(V))
/// dS/dVm = diag(V) conj(Ybus diag(V/|V|)) + conj(diag(Ibus)) diag(V/|V|)
/// ```
///
/// All voltage magnitudes must be non-zero.
pub fn d_sbus_d_v(y_bus: &Mat<Complex64>, v: &[Complex64]) -> (Mat<Complex64>, Mat<Complex64>) {
    let n = v.len();
    let j = Complex64::i();

    let i_bus = y_bus * v;
    let v_norm: Vec<Complex64> = v.iter().map(|v| v / v.norm()).collect();

    let mut d_sbus_d_va = Mat::zeros(n);
    let mut d_sbus_d_vm = Mat::zeros(n);
    for i in 0..n {
        for (k, &y_ik) in y_bus.row(i).iter().enumerate() {
            d_sbus_d_va.set(i, k, -j * v[i] * (y_ik * v[k]).conj());
            d_sbus_d_vm.set(i, k, v[i] * (y_ik * v_norm[k]).conj());
        }
        d_sbus_d_va.add_at(i, i, j * v[i] * i_bus[i].conj());
        d_sbus_d_vm.add_at(i, i, i_bus[i].conj() * v_norm[i]);
    }

    (d_sbus_d_va, d_sbus_d_vm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Bus, Line};
    use crate::ybus::make_ybus;

    fn s_bus(y_bus: &Mat<Complex64>, vm: &[f64], va: &[f64]) -> Vec<Complex64> {
        let v: Vec<Complex64> = vm
            .iter()
            .zip(va)
            .map(|(&m, &a)| Complex64::from_polar(m, a))
            .collect();
        let i_bus = y_bus * &v;
        v.iter().zip(&i_bus).map(|(v, i)| v * i.conj()).collect()
    }

    // Compare against central finite differences.
    #[test]
    fn matches_finite_differences() {
        let bus: Vec<Bus> = (1..=3).map(|id| Bus::pq(id, 0.0, 0.0)).collect();
        let line = vec![
            Line::new(1, 2, 0.02, 0.06),
            Line::new(2, 3, 0.01, 0.12),
            Line::new(1, 3, 0.05, 0.2),
        ];
        let y_bus = make_ybus(&bus, &line).unwrap();

        let vm = vec![1.02, 0.97, 0.99];
        let va = vec![0.0, -0.05, 0.03];
        let v: Vec<Complex64> = vm
            .iter()
            .zip(&va)
            .map(|(&m, &a)| Complex64::from_polar(m, a))
            .collect();
        let (d_va, d_vm) = d_sbus_d_v(&y_bus, &v);

        let h = 1e-6;
        for k in 0..3 {
            let (mut va_p, mut va_m) = (va.clone(), va.clone());
            va_p[k] += h;
            va_m[k] -= h;
            let (s_p, s_m) = (s_bus(&y_bus, &vm, &va_p), s_bus(&y_bus, &vm, &va_m));

            let (mut vm_p, mut vm_m) = (vm.clone(), vm.clone());
            vm_p[k] += h;
            vm_m[k] -= h;
            let (t_p, t_m) = (s_bus(&y_bus, &vm_p, &va), s_bus(&y_bus, &vm_m, &va));

            for i in 0..3 {
                let fd_va = (s_p[i] - s_m[i]) / (2.0 * h);
                let fd_vm = (t_p[i] - t_m[i]) / (2.0 * h);
                assert!((d_va.get(i, k) - fd_va).norm() < 1e-5, "dVa[{}][{}]", i, k);
                assert!((d_vm.get(i, k) - fd_vm).norm() < 1e-5, "dVm[{}][{}]", i, k);
            }
        }
    }
}
