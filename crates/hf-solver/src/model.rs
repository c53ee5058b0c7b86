//! Block registry, DOF numbering and lifecycle sequencing.

use hf_components::{Block, BlockDofs, BlockStamp, LocalState, Parameter, StampAudit};
use hf_graph::{IndexMap, Network};
use nalgebra::DVector;

use crate::dof::DofHandler;
use crate::error::{SolverError, SolverResult};
use crate::sparse::{Layer, SparseSystem};

/// A network of blocks with its global numbering and system storage.
///
/// Variables are numbered `P_<node>`, `Q_<node>` for every node in network
/// order, followed by each block's internal variables `<var>:<block>` in
/// registration order. Each block owns a contiguous range of equations.
/// The structure is fixed once construction succeeds.
#[derive(Debug)]
pub struct Model {
    network: Network,
    blocks: Vec<Box<dyn Block>>,
    dofs: Vec<BlockDofs>,
    handler: DofHandler,
    system: SparseSystem,
    pending: Vec<(usize, Vec<Parameter>)>,
}

impl Model {
    /// Register `blocks` (one per network block, matched by name) and build
    /// the system.
    ///
    /// Fails with a configuration error if the blocks don't match the
    /// network, a coupled variable can't be resolved, or any block writes
    /// outside its local ranges or leaves one of its equations empty.
    pub fn new(network: Network, blocks: Vec<Box<dyn Block>>) -> SolverResult<Self> {
        if blocks.len() != network.blocks().len() {
            return Err(SolverError::config(format!(
                "network has {} blocks but {} models were given",
                network.blocks().len(),
                blocks.len()
            )));
        }
        let index = IndexMap::from_network(&network);
        let mut handler = DofHandler::new();

        let mut node_vars = Vec::with_capacity(network.nodes().len());
        for node in network.nodes() {
            let p = handler.register_variable(format!("P_{}", node.name))?;
            let q = handler.register_variable(format!("Q_{}", node.name))?;
            node_vars.push((p, q));
        }

        // Port wiring and internal variables.
        let mut dofs = Vec::with_capacity(blocks.len());
        let mut seen = std::collections::HashSet::new();
        for block in &blocks {
            if !seen.insert(block.name().to_string()) {
                return Err(SolverError::config(format!(
                    "block {} registered twice",
                    block.name()
                )));
            }
            let info = network.block_by_name(block.name()).ok_or_else(|| {
                SolverError::config(format!("block {} is not in the network", block.name()))
            })?;
            let inlets = network.block_inlet_nodes(info.id);
            let outlets = network.block_outlet_nodes(info.id);
            if !block.accepts_ports(inlets.len(), outlets.len()) {
                return Err(SolverError::config(format!(
                    "{} block {} cannot connect {} inlet(s) and {} outlet(s)",
                    block.kind(),
                    block.name(),
                    inlets.len(),
                    outlets.len()
                )));
            }
            let mut vars = Vec::new();
            for node in inlets.iter().chain(&outlets) {
                let (p, q) = node_vars[index.node_idx(*node)?];
                vars.push(p);
                vars.push(q);
            }
            for var in block.internal_variables() {
                vars.push(handler.register_variable(format!("{var}:{}", block.name()))?);
            }
            let internals = block.internal_variables().len();
            let eqs = handler
                .register_equations(inlets.len() + outlets.len() + internals)
                .collect();
            dofs.push(BlockDofs {
                vars,
                eqs,
                inlets: inlets.len(),
                outlets: outlets.len(),
                internals,
            });
        }

        if handler.num_equations() != handler.num_variables() {
            return Err(SolverError::config(format!(
                "{} equations for {} variables",
                handler.num_equations(),
                handler.num_variables()
            )));
        }

        // Coupled variables owned by other blocks.
        for (i, block) in blocks.iter().enumerate() {
            for coupling in block.coupled_variables() {
                let owners: Vec<usize> = blocks
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.kind() == coupling.kind)
                    .map(|(j, _)| j)
                    .collect();
                let &[owner] = owners.as_slice() else {
                    return Err(SolverError::config(format!(
                        "block {} needs exactly one {} block, found {}",
                        block.name(),
                        coupling.kind,
                        owners.len()
                    )));
                };
                let local = blocks[owner]
                    .internal_variables()
                    .iter()
                    .position(|v| *v == coupling.variable)
                    .ok_or_else(|| {
                        SolverError::config(format!(
                            "block {} has no variable {}",
                            blocks[owner].name(),
                            coupling.variable
                        ))
                    })?;
                let global = dofs[owner].vars[dofs[owner].internal(local)];
                dofs[i].vars.push(global);
            }
        }

        let n = handler.num_variables();
        let mut rows = vec![Vec::new(); n];
        for d in &dofs {
            for &eq in &d.eqs {
                rows[eq].extend_from_slice(&d.vars);
            }
        }
        let system = SparseSystem::new(n, &rows)?;

        let mut model = Self {
            network,
            blocks,
            dofs,
            handler,
            system,
            pending: Vec::new(),
        };
        model.check_blocks()?;
        tracing::info!(
            dofs = n,
            nnz = model.system.nnz(),
            blocks = model.blocks.len(),
            "model assembled"
        );
        Ok(model)
    }

    // First assembly with every block audited.
    fn check_blocks(&mut self) -> SolverResult<()> {
        let n = self.size();
        let (y, ydot) = (vec![0.0; n], vec![0.0; n]);
        let mut audits: Vec<StampAudit> =
            self.dofs.iter().map(|d| StampAudit::new(d.eqs.len())).collect();

        self.system.begin_layer(Layer::Constant);
        for ((block, dofs), audit) in self.blocks.iter_mut().zip(&self.dofs).zip(&mut audits) {
            block.update_constant(&mut BlockStamp::audited(&mut self.system, dofs, audit));
        }
        self.system.begin_layer(Layer::Time);
        for ((block, dofs), audit) in self.blocks.iter_mut().zip(&self.dofs).zip(&mut audits) {
            block.update_time(&mut BlockStamp::audited(&mut self.system, dofs, audit), 0.0);
        }
        self.system.begin_layer(Layer::Solution);
        for ((block, dofs), audit) in self.blocks.iter_mut().zip(&self.dofs).zip(&mut audits) {
            let state = LocalState::new(dofs, &y, &ydot);
            block.update_solution(&mut BlockStamp::audited(&mut self.system, dofs, audit), &state);
            block.update_gradient(&mut BlockStamp::audited(&mut self.system, dofs, audit), &state);
        }

        for (block, audit) in self.blocks.iter().zip(&audits) {
            if let Some((row, col)) = audit.violation {
                return Err(SolverError::config(format!(
                    "block {} writes outside its local range at ({row}, {col})",
                    block.name()
                )));
            }
            let missing = audit.missing_rows();
            if !missing.is_empty() {
                return Err(SolverError::config(format!(
                    "block {} never writes its equations {missing:?}",
                    block.name()
                )));
            }
        }
        if self.system.dropped_writes() > 0 {
            return Err(SolverError::config("contributions fell outside the sparsity pattern"));
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.handler.num_variables()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn blocks(&self) -> &[Box<dyn Block>] {
        &self.blocks
    }

    pub fn block_dofs(&self, index: usize) -> &BlockDofs {
        &self.dofs[index]
    }

    pub fn system(&self) -> &SparseSystem {
        &self.system
    }

    pub fn variable_names(&self) -> &[String] {
        self.handler.variables()
    }

    pub fn dof_of(&self, name: &str) -> Option<usize> {
        self.handler.index_of(name)
    }

    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.name() == name)
    }

    /// Validate new parameters for `block` and queue them for the next
    /// `update_time`.
    pub fn queue_parameters(&mut self, block: &str, values: Vec<Parameter>) -> SolverResult<()> {
        let index = self
            .block_index(block)
            .ok_or_else(|| SolverError::config(format!("unknown block {block}")))?;
        let mut probe = self.blocks[index].params().clone();
        probe.replace(values.clone())?;
        self.pending.push((index, values));
        Ok(())
    }

    pub fn has_pending_parameters(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Discrete block states keyed `<state>:<block>`.
    pub fn discrete_states(&self) -> Vec<(String, String)> {
        self.blocks
            .iter()
            .flat_map(|b| {
                b.discrete_state()
                    .into_iter()
                    .map(move |(k, v)| (format!("{k}:{}", b.name()), v.to_string()))
            })
            .collect()
    }

    pub fn update_constant(&mut self) {
        self.system.begin_layer(Layer::Constant);
        for (block, dofs) in self.blocks.iter_mut().zip(&self.dofs) {
            block.update_constant(&mut BlockStamp::new(&mut self.system, dofs));
        }
    }

    /// Apply queued parameters (re-running the constant layer) and write
    /// the time layer at `t`.
    pub fn update_time(&mut self, t: f64) -> SolverResult<()> {
        if !self.pending.is_empty() {
            for (index, values) in std::mem::take(&mut self.pending) {
                self.blocks[index].set_parameters(values)?;
                tracing::debug!(block = self.blocks[index].name(), "parameters updated");
            }
            self.update_constant();
        }
        self.system.begin_layer(Layer::Time);
        for (block, dofs) in self.blocks.iter_mut().zip(&self.dofs) {
            block.update_time(&mut BlockStamp::new(&mut self.system, dofs), t);
        }
        Ok(())
    }

    /// Rewrite the solution layer for the iterate `(y, ẏ)`.
    pub fn update_solution(&mut self, y: &[f64], ydot: &[f64]) {
        self.system.begin_layer(Layer::Solution);
        for (block, dofs) in self.blocks.iter_mut().zip(&self.dofs) {
            let state = LocalState::new(dofs, y, ydot);
            block.update_solution(&mut BlockStamp::new(&mut self.system, dofs), &state);
        }
    }

    /// Add gradient contributions to the solution layer; call after
    /// `update_solution` with the same iterate.
    pub fn update_gradient(&mut self, y: &[f64], ydot: &[f64]) {
        for (block, dofs) in self.blocks.iter_mut().zip(&self.dofs) {
            let state = LocalState::new(dofs, y, ydot);
            block.update_gradient(&mut BlockStamp::new(&mut self.system, dofs), &state);
        }
    }

    pub fn residual(&self, y: &[f64], ydot: &[f64]) -> DVector<f64> {
        self.system.residual(y, ydot)
    }

    /// Newton update for the current layers: solves `J Δ = -r`.
    pub fn solve(&mut self, e_coeff: f64, residual: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.system.solve(e_coeff, residual)
    }
}
