//! The contribution interface between blocks and the global system.
//!
//! Blocks never see global indices. Each block is handed a [`BlockStamp`]
//! that translates local equation/variable indices through its [`BlockDofs`]
//! and forwards the value into whatever [`Assembly`] the solver is filling.
//!
//! Local variable layout: for each inlet node then each outlet node `P`, `Q`;
//! then the block's internal variables; then coupled external variables.

/// Sink for block contributions, addressed by global row/column.
///
/// All contributions are additive.
pub trait Assembly {
    fn add_e(&mut self, row: usize, col: usize, value: f64);
    fn add_f(&mut self, row: usize, col: usize, value: f64);
    fn add_c(&mut self, row: usize, value: f64);
    fn add_dc_dy(&mut self, row: usize, col: usize, value: f64);
    fn add_dc_dydot(&mut self, row: usize, col: usize, value: f64);
}

/// Global indices owned or read by one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDofs {
    /// Global variable ids in local order.
    pub vars: Vec<usize>,
    /// Global equation ids in local order (contiguous).
    pub eqs: Vec<usize>,
    pub inlets: usize,
    pub outlets: usize,
    pub internals: usize,
}

impl BlockDofs {
    pub fn ports(&self) -> usize {
        self.inlets + self.outlets
    }

    /// Local index of the pressure at node-end `k` (inlets first).
    pub fn p(k: usize) -> usize {
        2 * k
    }

    /// Local index of the flow at node-end `k` (inlets first).
    pub fn q(k: usize) -> usize {
        2 * k + 1
    }

    /// Local index of internal variable `i`.
    pub fn internal(&self, i: usize) -> usize {
        2 * self.ports() + i
    }

    /// Local index of coupled variable `j`.
    pub fn coupled(&self, j: usize) -> usize {
        2 * self.ports() + self.internals + j
    }
}

/// Read-only view of the current iterate through a block's local indices.
///
/// Out-of-range reads return NaN so that a malformed block poisons its own
/// residual instead of reading a neighbour's unknowns.
#[derive(Debug, Clone, Copy)]
pub struct LocalState<'a> {
    dofs: &'a BlockDofs,
    y: &'a [f64],
    ydot: &'a [f64],
}

impl<'a> LocalState<'a> {
    pub fn new(dofs: &'a BlockDofs, y: &'a [f64], ydot: &'a [f64]) -> Self {
        Self { dofs, y, ydot }
    }

    pub fn y(&self, local: usize) -> f64 {
        self.dofs
            .vars
            .get(local)
            .and_then(|&g| self.y.get(g))
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn ydot(&self, local: usize) -> f64 {
        self.dofs
            .vars
            .get(local)
            .and_then(|&g| self.ydot.get(g))
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn dofs(&self) -> &BlockDofs {
        self.dofs
    }
}

/// Record of what a block wrote during an audited assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampAudit {
    pub rows_written: Vec<bool>,
    /// First out-of-range write, as `(local_row, local_col)`.
    pub violation: Option<(usize, usize)>,
}

impl StampAudit {
    pub fn new(rows: usize) -> Self {
        Self {
            rows_written: vec![false; rows],
            violation: None,
        }
    }

    pub fn missing_rows(&self) -> Vec<usize> {
        self.rows_written
            .iter()
            .enumerate()
            .filter(|(_, w)| !**w)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Per-block writer handed to `Block::update_*`.
pub struct BlockStamp<'a> {
    target: &'a mut dyn Assembly,
    dofs: &'a BlockDofs,
    audit: Option<&'a mut StampAudit>,
}

impl<'a> BlockStamp<'a> {
    pub fn new(target: &'a mut dyn Assembly, dofs: &'a BlockDofs) -> Self {
        Self {
            target,
            dofs,
            audit: None,
        }
    }

    pub fn audited(
        target: &'a mut dyn Assembly,
        dofs: &'a BlockDofs,
        audit: &'a mut StampAudit,
    ) -> Self {
        Self {
            target,
            dofs,
            audit: Some(audit),
        }
    }

    pub fn dofs(&self) -> &BlockDofs {
        self.dofs
    }

    // Resolves a local (row, col); col = None for vector entries.
    fn resolve(&mut self, eq: usize, var: Option<usize>) -> Option<(usize, usize)> {
        let row = self.dofs.eqs.get(eq).copied();
        let col = match var {
            Some(v) => self.dofs.vars.get(v).copied(),
            None => Some(0),
        };
        match (row, col) {
            (Some(r), Some(c)) => {
                if let Some(audit) = self.audit.as_deref_mut() {
                    audit.rows_written[eq] = true;
                }
                Some((r, c))
            }
            _ => {
                if let Some(audit) = self.audit.as_deref_mut() {
                    audit.violation.get_or_insert((eq, var.unwrap_or(0)));
                }
                None
            }
        }
    }

    pub fn e(&mut self, eq: usize, var: usize, value: f64) {
        if let Some((r, c)) = self.resolve(eq, Some(var)) {
            self.target.add_e(r, c, value);
        }
    }

    pub fn f(&mut self, eq: usize, var: usize, value: f64) {
        if let Some((r, c)) = self.resolve(eq, Some(var)) {
            self.target.add_f(r, c, value);
        }
    }

    pub fn c(&mut self, eq: usize, value: f64) {
        if let Some((r, _)) = self.resolve(eq, None) {
            self.target.add_c(r, value);
        }
    }

    pub fn dc_dy(&mut self, eq: usize, var: usize, value: f64) {
        if let Some((r, c)) = self.resolve(eq, Some(var)) {
            self.target.add_dc_dy(r, c, value);
        }
    }

    pub fn dc_dydot(&mut self, eq: usize, var: usize, value: f64) {
        if let Some((r, c)) = self.resolve(eq, Some(var)) {
            self.target.add_dc_dydot(r, c, value);
        }
    }
}

/// Dense test double for [`Assembly`]; also used to inspect single blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseAssembly {
    pub n: usize,
    pub e: Vec<f64>,
    pub f: Vec<f64>,
    pub c: Vec<f64>,
    pub dc_dy: Vec<f64>,
    pub dc_dydot: Vec<f64>,
}

impl DenseAssembly {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            e: vec![0.0; n * n],
            f: vec![0.0; n * n],
            c: vec![0.0; n],
            dc_dy: vec![0.0; n * n],
            dc_dydot: vec![0.0; n * n],
        }
    }

    pub fn e_at(&self, row: usize, col: usize) -> f64 {
        self.e[row * self.n + col]
    }

    pub fn f_at(&self, row: usize, col: usize) -> f64 {
        self.f[row * self.n + col]
    }

    pub fn dc_dy_at(&self, row: usize, col: usize) -> f64 {
        self.dc_dy[row * self.n + col]
    }

    /// `E ẏ + F y + c` evaluated densely.
    pub fn residual(&self, y: &[f64], ydot: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| {
                let row = i * self.n..(i + 1) * self.n;
                let ey: f64 = self.e[row.clone()].iter().zip(ydot).map(|(a, b)| a * b).sum();
                let fy: f64 = self.f[row].iter().zip(y).map(|(a, b)| a * b).sum();
                ey + fy + self.c[i]
            })
            .collect()
    }
}

impl Assembly for DenseAssembly {
    fn add_e(&mut self, row: usize, col: usize, value: f64) {
        self.e[row * self.n + col] += value;
    }
    fn add_f(&mut self, row: usize, col: usize, value: f64) {
        self.f[row * self.n + col] += value;
    }
    fn add_c(&mut self, row: usize, value: f64) {
        self.c[row] += value;
    }
    fn add_dc_dy(&mut self, row: usize, col: usize, value: f64) {
        self.dc_dy[row * self.n + col] += value;
    }
    fn add_dc_dydot(&mut self, row: usize, col: usize, value: f64) {
        self.dc_dydot[row * self.n + col] += value;
    }
}
