//! The scheduling engine: enable propagation, dependency-graph construction,
//! topological execution, and heap pooling.

use std::any::TypeId;
use std::collections::VecDeque;

use joosc_arena::Heap;
use joosc_diagnostics::DiagnosticEngine;
use petgraph::graphmap::DiGraphMap;
use rustc_hash::FxHashMap;

use crate::error::PassError;
use crate::pass::{DependencyContext, Pass, PassState, RunContext};

struct HeapSlot {
    heap: Heap,
    owner: Option<usize>,
}

/// Drives a fixed roster of [`Pass`]es through enable propagation,
/// dependency registration, and topologically-ordered execution, handing
/// each pass a pooled [`Heap`] it keeps for the lifetime its dependents need
/// it.
pub struct PassManager {
    passes: Vec<Option<Box<dyn Pass>>>,
    type_ids: Vec<TypeId>,
    state: Vec<PassState>,
    enabled: Vec<bool>,
    preserve: Vec<bool>,
    /// `dependencies[i]` lists the indices of passes that must run before
    /// pass `i`, resolved from the `TypeId`s each pass declared.
    dependencies: Vec<Vec<usize>>,
    /// `pending[i]` counts the enabled, not-yet-cleaned-up dependents of
    /// pass `i` still to run; computed once from the whole order before any
    /// pass runs, so it reflects total fan-in rather than how much of the
    /// order has executed so far.
    pending: Vec<usize>,
    heap_of_pass: Vec<Option<usize>>,
    heaps: Vec<HeapSlot>,
    diag: DiagnosticEngine,
}

impl Default for PassManager {
    fn default() -> Self { Self::new() }
}

impl PassManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            type_ids: Vec::new(),
            state: Vec::new(),
            enabled: Vec::new(),
            preserve: Vec::new(),
            dependencies: Vec::new(),
            pending: Vec::new(),
            heap_of_pass: Vec::new(),
            heaps: Vec::new(),
            diag: DiagnosticEngine::new(),
        }
    }

    /// The diagnostic engine shared by every pass run through this manager.
    pub fn diag(&mut self) -> &mut DiagnosticEngine { &mut self.diag }

    /// Registers `pass`, returning its index in the roster.
    ///
    /// A pass registered with `enabled = false` only runs if enable
    /// propagation later reaches it through another enabled pass's
    /// dependency declaration.
    pub fn add_pass<T: Pass + 'static>(&mut self, pass: T, enabled: bool) -> usize {
        let idx = self.passes.len();
        self.passes.push(Some(Box::new(pass)));
        self.type_ids.push(TypeId::of::<T>());
        self.state.push(PassState::Uninitialized);
        self.enabled.push(enabled);
        self.preserve.push(false);
        self.dependencies.push(Vec::new());
        self.pending.push(0);
        self.heap_of_pass.push(None);
        idx
    }

    /// Forces the results of pass type `T` to be preserved: its heap is
    /// never returned to the pool, even once every dependent has run.
    /// Preservation is transitive — every pass `T` depends on, directly or
    /// indirectly, is preserved along with it, so that inspecting `T`'s
    /// results later never reaches a freed dependency.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::PassNotFound`] if no pass of type `T` is
    /// registered, or [`PassError::MultiplePassesFound`] if more than one is.
    pub fn preserve_analysis<T: Pass + 'static>(&mut self) -> Result<(), PassError> {
        let idx = self.index_of::<T>()?;
        self.preserve[idx] = true;
        Ok(())
    }

    /// Looks up the single registered pass of type `T`, regardless of
    /// whether it has run yet.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::PassNotFound`] if no pass of type `T` is
    /// registered, or [`PassError::MultiplePassesFound`] if more than one is.
    pub fn get_pass<T: Pass + 'static>(&self) -> Result<&T, PassError> {
        let idx = self.index_of::<T>()?;
        Ok(self.passes[idx].as_deref().expect("pass present outside of its own run").as_any().downcast_ref::<T>().expect("type matched by index_of"))
    }

    fn index_of<T: Pass + 'static>(&self) -> Result<usize, PassError> {
        let type_name = std::any::type_name::<T>();
        let mut matches = self.type_ids.iter().enumerate().filter(|(_, t)| **t == TypeId::of::<T>());
        let (idx, _) = matches.next().ok_or(PassError::PassNotFound { type_name })?;
        if matches.next().is_some() {
            return Err(PassError::MultiplePassesFound { type_name });
        }
        Ok(idx)
    }

    /// Runs every enabled pass (and every pass transitively required by an
    /// enabled pass) in dependency order.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::CyclicDependency`] if the dependency graph is
    /// not a DAG, or propagates the first [`PassError::PassFailed`] /
    /// [`PassError::HeapUseAfterDestroy`] raised by a pass.
    pub fn run(&mut self) -> Result<(), PassError> {
        self.collect_dependencies();
        self.propagate_enabled();
        let order = self.topological_order()?;
        log::debug!("topological order: {:?}", order.iter().map(|&i| self.pass_name(i)).collect::<Vec<_>>());
        self.compute_pending(&order);

        for idx in order {
            if !self.enabled[idx] {
                continue;
            }
            if self.heap_of_pass[idx].is_none() {
                self.heap_of_pass[idx] = Some(self.acquire_heap(idx));
            }
            self.state[idx] = PassState::RegisterDependencies;
            self.run_one(idx)?;
            self.cleanup_one(idx);
        }
        Ok(())
    }

    /// Calls `compute_dependencies` once per registered pass and resolves
    /// each declared `TypeId` to a roster index.
    fn collect_dependencies(&mut self) {
        let mut by_type: FxHashMap<TypeId, Vec<usize>> = FxHashMap::default();
        for (idx, ty) in self.type_ids.iter().enumerate() {
            by_type.entry(*ty).or_default().push(idx);
        }

        for idx in 0..self.passes.len() {
            let pass = self.passes[idx].as_deref().expect("not mid-run during collection");
            let mut ctx = DependencyContext::new();
            pass.compute_dependencies(&mut ctx);
            let (deps, preserve) = ctx.into_parts();
            if preserve {
                self.preserve[idx] = true;
            }
            self.dependencies[idx] =
                deps.iter().filter_map(|ty| by_type.get(ty)).flatten().copied().filter(|&d| d != idx).collect();
            for &dep in &self.dependencies[idx] {
                log::debug!("dependency edge: `{}` -> `{}`", self.pass_name(dep), self.pass_name(idx));
            }
            self.state[idx] = PassState::PropagateEnabled;
        }
        self.propagate_preserve();
    }

    /// A preserved pass's heap must stay live for as long as anything it
    /// depends on might still be inspected through it, so preservation
    /// walks backward over the dependency edges the same way
    /// `propagate_enabled` does: every pass reachable from a preserved pass
    /// is preserved too.
    fn propagate_preserve(&mut self) {
        let mut queue: VecDeque<usize> =
            self.preserve.iter().enumerate().filter(|&(_, &p)| p).map(|(i, _)| i).collect();
        while let Some(idx) = queue.pop_front() {
            for &dep in &self.dependencies[idx].clone() {
                if !self.preserve[dep] {
                    self.preserve[dep] = true;
                    log::debug!("`{}` transitively preserved via `{}`", self.pass_name(dep), self.pass_name(idx));
                    queue.push_back(dep);
                }
            }
        }
    }

    /// Declaring a dependency on a pass enables it: transitively enabled
    /// passes are reachable from the initially-enabled set by following
    /// dependency edges backward.
    fn propagate_enabled(&mut self) {
        let mut queue: VecDeque<usize> =
            self.enabled.iter().enumerate().filter(|&(_, &e)| e).map(|(i, _)| i).collect();
        while let Some(idx) = queue.pop_front() {
            for &dep in &self.dependencies[idx].clone() {
                if !self.enabled[dep] {
                    self.enabled[dep] = true;
                    log::debug!("`{}` transitively enabled by `{}`", self.pass_name(dep), self.pass_name(idx));
                    queue.push_back(dep);
                }
            }
        }
    }

    /// Builds the dependency DAG over enabled passes and returns a
    /// topological run order via Kahn's algorithm.
    ///
    /// ## Errors
    ///
    /// Returns [`PassError::CyclicDependency`] if any enabled pass
    /// participates in a cycle.
    fn topological_order(&self) -> Result<Vec<usize>, PassError> {
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for idx in 0..self.passes.len() {
            if self.enabled[idx] {
                graph.add_node(idx);
            }
        }
        for idx in 0..self.passes.len() {
            if !self.enabled[idx] {
                continue;
            }
            for &dep in &self.dependencies[idx] {
                if self.enabled[dep] {
                    graph.add_edge(dep, idx, ());
                }
            }
        }

        let mut in_degree: FxHashMap<usize, usize> =
            graph.nodes().map(|n| (n, graph.neighbors_directed(n, petgraph::Direction::Incoming).count())).collect();
        let mut ready: VecDeque<usize> =
            in_degree.iter().filter(|&(_, &d)| d == 0).map(|(&n, _)| n).collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(idx) = ready.pop_front() {
            order.push(idx);
            for succ in graph.neighbors_directed(idx, petgraph::Direction::Outgoing).collect::<Vec<_>>() {
                let degree = in_degree.get_mut(&succ).expect("successor tracked");
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(succ);
                }
            }
        }

        if order.len() != in_degree.len() {
            let cycle = graph
                .nodes()
                .filter(|n| !order.contains(n))
                .map(|n| self.pass_name(n).to_owned())
                .collect();
            return Err(PassError::CyclicDependency { cycle });
        }
        Ok(order)
    }

    /// Counts, for every enabled pass, how many of its enabled dependents
    /// will still need its heap once the whole order has run. Computed in
    /// one pass over the full order before any pass starts, so it reflects
    /// total fan-in rather than however much of the order has executed —
    /// unlike a ref-count bumped lazily as each dependent starts, which
    /// would let a shared dependency's heap look unreferenced (and get
    /// freed back to the pool) between two of its dependents' runs.
    fn compute_pending(&mut self, order: &[usize]) {
        for &idx in order {
            for &dep in &self.dependencies[idx] {
                self.pending[dep] += 1;
            }
        }
    }

    /// Assigns `idx` a pooled or freshly-allocated heap. Called immediately
    /// before the pass runs, in topological order, so a heap `cleanup_one`
    /// freed for an already-finished pass is already back in the pool and
    /// eligible for reuse here.
    fn acquire_heap(&mut self, owner: usize) -> usize {
        if let Some(pos) = self.heaps.iter().position(|h| h.owner.is_none()) {
            self.heaps[pos].heap.reset();
            self.heaps[pos].owner = Some(owner);
            log::debug!("reusing pooled heap #{pos} for `{}`", self.pass_name(owner));
            return pos;
        }
        self.heaps.push(HeapSlot { heap: Heap::new(), owner: Some(owner) });
        log::debug!("allocated new heap #{} for `{}`", self.heaps.len() - 1, self.pass_name(owner));
        self.heaps.len() - 1
    }

    fn run_one(&mut self, idx: usize) -> Result<(), PassError> {
        let mut pass = self.passes[idx].take().expect("pass not already running");
        self.state[idx] = PassState::Running;

        let result = (|| {
            pass.init()?;
            let heap_idx = self.heap_of_pass[idx].expect("heap assigned during registration");
            let mut ctx = RunContext::new(&self.heaps[heap_idx].heap, &mut self.diag, &self.passes);
            pass.run(&mut ctx)
        })();

        self.passes[idx] = Some(pass);
        match &result {
            Ok(()) => {
                log::debug!("pass `{}` completed", self.pass_name(idx));
                self.state[idx] = PassState::Valid;
            }
            Err(err) => {
                log::error!("pass `{}` failed: {err}", self.pass_name(idx));
                self.state[idx] = PassState::Invalid;
            }
        }
        result
    }

    /// Releases this pass's claim on each dependency's heap, returning the
    /// heap to the pool once its pending-dependent count hits zero, unless
    /// its owner was marked preserved.
    fn cleanup_one(&mut self, idx: usize) {
        for &dep in &self.dependencies[idx].clone() {
            self.pending[dep] = self.pending[dep].saturating_sub(1);
            if self.pending[dep] == 0 && !self.preserve[dep] {
                let Some(dep_heap) = self.heap_of_pass[dep] else { continue };
                log::debug!("freeing heap owned by `{}` back to the pool", self.pass_name(dep));
                self.heaps[dep_heap].owner = None;
            }
        }
        self.state[idx] = PassState::Cleanup;
    }

    fn pass_name(&self, idx: usize) -> &'static str {
        self.passes[idx].as_deref().map_or("<running>", Pass::name)
    }
}
