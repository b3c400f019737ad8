use num_complex::Complex64;
use std::ops::Mul;

/// Square matrix with values stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mat<T> {
    n: usize,
    values: Vec<T>,
}

impl<T> Mat<T>
where
    T: Copy + Default,
{
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            values: vec![T::default(); n * n],
        }
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> T {
        self.values[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, v: T) {
        self.values[i * self.n + j] = v;
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    pub fn diagonal(&self) -> Vec<T> {
        (0..self.n).map(|i| self.get(i, i)).collect()
    }
}

impl Mat<Complex64> {
    pub fn add_at(&mut self, i: usize, j: usize, v: Complex64) {
        self.values[i * self.n + j] += v;
    }

    pub fn real(&self) -> Mat<f64> {
        Mat {
            n: self.n,
            values: self.values.iter().map(|z| z.re).collect(),
        }
    }

    pub fn imag(&self) -> Mat<f64> {
        Mat {
            n: self.n,
            values: self.values.iter().map(|z| z.im).collect(),
        }
    }
}

impl Mul<&[Complex64]> for &Mat<Complex64> {
    type Output = Vec<Complex64>;

    fn mul(self, x: &[Complex64]) -> Self::Output {
        assert_eq!(x.len(), self.n);
        (0..self.n)
            .map(|i| self.row(i).iter().zip(x).map(|(a, b)| a * b).sum())
            .collect()
    }
}

impl Mul<&Vec<Complex64>> for &Mat<Complex64> {
    type Output = Vec<Complex64>;

    fn mul(self, x: &Vec<Complex64>) -> Self::Output {
        self * x.as_slice()
    }
}
