//! Sparse system storage with a fixed pattern and layered value arenas.
//!
//! The pattern is built once from the blocks' local couplings and never
//! regrown. Values live in three layers so that constant contributions are
//! written once, time-dependent ones once per step and solution-dependent ones
//! once per Newton iteration. Each layer holds `E`, `F`, `dC/dy`, `dC/dẏ` on
//! the pattern plus the dense vector `c`; the system sees their sum.

use hf_components::Assembly;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use nalgebra_sparse::pattern::SparsityPattern;

use crate::error::{SolverError, SolverResult};

/// Which arena subsequent contributions accumulate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Constant = 0,
    Time = 1,
    Solution = 2,
}

#[derive(Debug, Clone)]
struct Arena {
    e: Vec<f64>,
    f: Vec<f64>,
    dc_dy: Vec<f64>,
    dc_dydot: Vec<f64>,
    c: Vec<f64>,
}

impl Arena {
    fn zeros(n: usize, nnz: usize) -> Self {
        Self {
            e: vec![0.0; nnz],
            f: vec![0.0; nnz],
            dc_dy: vec![0.0; nnz],
            dc_dydot: vec![0.0; nnz],
            c: vec![0.0; n],
        }
    }

    fn clear(&mut self) {
        for v in [&mut self.e, &mut self.f, &mut self.dc_dy, &mut self.dc_dydot, &mut self.c] {
            v.fill(0.0);
        }
    }
}

type Pick = fn(&mut Arena) -> &mut Vec<f64>;

fn pick_e(a: &mut Arena) -> &mut Vec<f64> {
    &mut a.e
}

fn pick_f(a: &mut Arena) -> &mut Vec<f64> {
    &mut a.f
}

fn pick_dc_dy(a: &mut Arena) -> &mut Vec<f64> {
    &mut a.dc_dy
}

fn pick_dc_dydot(a: &mut Arena) -> &mut Vec<f64> {
    &mut a.dc_dydot
}

#[derive(Debug, Clone)]
pub struct SparseSystem {
    n: usize,
    pattern: SparsityPattern,
    layers: [Arena; 3],
    current: Layer,
    /// Writes that fell outside the pattern since construction.
    dropped: usize,
    scratch: DMatrix<f64>,
}

impl SparseSystem {
    /// Build the system from per-row column lists (any order, duplicates allowed).
    pub fn new(n: usize, rows: &[Vec<usize>]) -> SolverResult<Self> {
        if rows.len() != n {
            return Err(SolverError::config(format!(
                "pattern has {} rows for a system of size {n}",
                rows.len()
            )));
        }
        let mut offsets = Vec::with_capacity(n + 1);
        let mut indices = Vec::new();
        offsets.push(0);
        for row in rows {
            let mut cols = row.clone();
            cols.sort_unstable();
            cols.dedup();
            indices.extend(cols);
            offsets.push(indices.len());
        }
        let pattern = SparsityPattern::try_from_offsets_and_indices(n, n, offsets, indices)
            .map_err(|e| SolverError::config(format!("invalid sparsity pattern: {e}")))?;
        let nnz = pattern.nnz();
        let arena = Arena::zeros(n, nnz);
        Ok(Self {
            n,
            pattern,
            layers: [arena.clone(), arena.clone(), arena],
            current: Layer::Constant,
            dropped: 0,
            scratch: DMatrix::zeros(n, n),
        })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn nnz(&self) -> usize {
        self.pattern.nnz()
    }

    pub fn pattern(&self) -> &SparsityPattern {
        &self.pattern
    }

    pub fn dropped_writes(&self) -> usize {
        self.dropped
    }

    /// Zero `layer` (structure preserved) and direct writes into it.
    pub fn begin_layer(&mut self, layer: Layer) {
        self.layers[layer as usize].clear();
        self.current = layer;
    }

    fn entry(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.n {
            return None;
        }
        let start = self.pattern.major_offsets()[row];
        self.pattern
            .lane(row)
            .binary_search(&col)
            .ok()
            .map(|k| start + k)
    }

    fn add_entry(&mut self, row: usize, col: usize, value: f64, pick: Pick) {
        match self.entry(row, col) {
            Some(k) => pick(&mut self.layers[self.current as usize])[k] += value,
            None => self.dropped += 1,
        }
    }

    /// `(ΣE) ẏ + (ΣF) y + Σc`.
    pub fn residual(&self, y: &[f64], ydot: &[f64]) -> DVector<f64> {
        let offsets = self.pattern.major_offsets();
        let mut r = DVector::zeros(self.n);
        for i in 0..self.n {
            let mut acc = 0.0;
            for layer in &self.layers {
                acc += layer.c[i];
            }
            for (k, &j) in (offsets[i]..offsets[i + 1]).zip(self.pattern.lane(i)) {
                for layer in &self.layers {
                    acc += layer.e[k] * ydot[j] + layer.f[k] * y[j];
                }
            }
            r[i] = acc;
        }
        r
    }

    /// Jacobian values on the pattern: `ΣF + dC/dy + e_coeff (ΣE + dC/dẏ)`.
    fn jacobian_values(&self, e_coeff: f64) -> Vec<f64> {
        let mut values = vec![0.0; self.nnz()];
        for layer in &self.layers {
            for (k, v) in values.iter_mut().enumerate() {
                *v += layer.f[k] + layer.dc_dy[k] + e_coeff * (layer.e[k] + layer.dc_dydot[k]);
            }
        }
        values
    }

    /// Jacobian as a CSR matrix sharing the system's pattern.
    pub fn jacobian(&self, e_coeff: f64) -> SolverResult<CsrMatrix<f64>> {
        CsrMatrix::try_from_pattern_and_values(self.pattern.clone(), self.jacobian_values(e_coeff))
            .map_err(|e| SolverError::numerical(format!("jacobian assembly failed: {e}")))
    }

    /// Solve `J Δ = -r` with a dense LU factorization.
    pub fn solve(&mut self, e_coeff: f64, residual: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let values = self.jacobian_values(e_coeff);
        let offsets = self.pattern.major_offsets();
        self.scratch.fill(0.0);
        for i in 0..self.n {
            for (k, &j) in (offsets[i]..offsets[i + 1]).zip(self.pattern.lane(i)) {
                self.scratch[(i, j)] = values[k];
            }
        }
        let dx = self
            .scratch
            .clone()
            .lu()
            .solve(&(-residual))
            .ok_or_else(|| SolverError::numerical("singular Jacobian"))?;
        if dx.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::numerical("non-finite Newton update"));
        }
        Ok(dx)
    }
}

impl Assembly for SparseSystem {
    fn add_e(&mut self, row: usize, col: usize, value: f64) {
        self.add_entry(row, col, value, pick_e);
    }

    fn add_f(&mut self, row: usize, col: usize, value: f64) {
        self.add_entry(row, col, value, pick_f);
    }

    fn add_c(&mut self, row: usize, value: f64) {
        match self.layers[self.current as usize].c.get_mut(row) {
            Some(c) => *c += value,
            None => self.dropped += 1,
        }
    }

    fn add_dc_dy(&mut self, row: usize, col: usize, value: f64) {
        self.add_entry(row, col, value, pick_dc_dy);
    }

    fn add_dc_dydot(&mut self, row: usize, col: usize, value: f64) {
        self.add_entry(row, col, value, pick_dc_dydot);
    }
}
