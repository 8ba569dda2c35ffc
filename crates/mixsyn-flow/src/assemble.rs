//! Network Assembler
//!
//! Stitches optimized groups back into one network:
//!
//! 1. Primary inputs and latches are recreated in original order.
//! 2. Gates of groups that were not improved (including SKIP groups) are
//!    copied verbatim, in original order.
//! 3. An improved group's logic is instantiated the first time one of its
//!    roots is needed, once all of its leaves exist.
//! 4. Primary outputs are re-bound by name and position, then latch
//!    next-state inputs are connected.
//!
//! An improved group whose leaves depend on its own roots through other
//! groups cannot be instantiated as a unit. Such a group falls back to its
//! original logic and assembly restarts. The original network is never
//! modified.

use crate::dispatch::StrategyResult;
use crate::error::AssembleError;
use mixsyn_net::{
    NetError, Network, Node, NodeId, PartitionId, PartitionView, Signal, SubNetwork,
};
use std::collections::HashMap;

/// Why one assembly attempt stopped
enum Failure {
    /// The result at this index closes a cycle through other groups
    Cycle(usize),
    Error(AssembleError),
}

impl From<AssembleError> for Failure {
    fn from(err: AssembleError) -> Self {
        Failure::Error(err)
    }
}

impl From<NetError> for Failure {
    fn from(err: NetError) -> Self {
        Failure::Error(AssembleError::Net(err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Node(NodeId),
    Result(usize),
}

struct Assembler<'a> {
    original: &'a Network,
    view: &'a PartitionView<'a>,
    results: &'a [StrategyResult],
    /// Improved result owning each partition
    owner: HashMap<PartitionId, usize>,
    state: Vec<State>,
    /// Signal in the new network standing for each original node
    map: Vec<Option<Signal>>,
    new: Network,
}

impl<'a> Assembler<'a> {
    fn new(
        original: &'a Network,
        view: &'a PartitionView<'a>,
        results: &'a [StrategyResult],
    ) -> Result<Self, AssembleError> {
        let mut owner = HashMap::new();
        for (i, result) in results.iter().enumerate().filter(|(_, r)| r.improved) {
            let expected = result.leaves.len() + result.roots.len();
            let found = result.network.num_inputs() + result.network.num_outputs();
            if result.network.num_inputs() != result.leaves.len()
                || result.network.num_outputs() != result.roots.len()
            {
                return Err(AssembleError::InterfaceMismatch {
                    region: result.group.region.clone(),
                    expected,
                    found,
                });
            }
            for p in result.group.region.partitions() {
                owner.insert(p, i);
            }
        }

        Ok(Self {
            original,
            view,
            results,
            owner,
            state: vec![State::Pending; results.len()],
            map: vec![None; original.size()],
            new: Network::new(original.name.clone()),
        })
    }

    /// Improved result that replaces a gate, if any
    fn owner_of(&self, id: NodeId) -> Option<usize> {
        let is_gate = self.original.node(id).is_some_and(Node::is_gate);
        if is_gate {
            self.owner.get(&self.view.partition_of(id)).copied()
        } else {
            None
        }
    }

    fn mapped(&self, id: NodeId) -> Option<Signal> {
        self.map.get(id.index()).copied().flatten()
    }

    fn signal(&mut self, s: Signal) -> Result<Signal, Failure> {
        self.ensure(s.node)?;
        let mapped = self
            .mapped(s.node)
            .ok_or(NetError::DanglingSignal(s.node))?;
        Ok(mapped.invert_if(s.inverted))
    }

    /// Make sure an original node has a counterpart in the new network
    fn ensure(&mut self, id: NodeId) -> Result<(), Failure> {
        let original = self.original;
        let mut stack = vec![Task::Node(id)];

        while let Some(&task) = stack.last() {
            match task {
                Task::Node(n) => {
                    if self.mapped(n).is_some() {
                        stack.pop();
                        continue;
                    }
                    let node = original.node(n).ok_or(NetError::DanglingSignal(n))?;

                    if let Some(r) = self.owner_of(n) {
                        match self.state[r] {
                            State::Pending => stack.push(Task::Result(r)),
                            State::Active => return Err(Failure::Cycle(r)),
                            State::Done => return Err(AssembleError::MissingRoot(n).into()),
                        }
                        continue;
                    }

                    if !node.is_gate() {
                        return Err(NetError::DanglingSignal(n).into());
                    }
                    let pending: Vec<NodeId> = node
                        .fanins()
                        .iter()
                        .map(|s| s.node)
                        .filter(|&f| self.mapped(f).is_none())
                        .collect();
                    if !pending.is_empty() {
                        stack.extend(pending.into_iter().map(Task::Node));
                        continue;
                    }

                    let copy = self.copy_gate(node);
                    let new_id = self.new.push_node(copy);
                    self.map[n.index()] = Some(Signal::new(new_id));
                    stack.pop();
                }
                Task::Result(r) => {
                    if self.state[r] == State::Done {
                        stack.pop();
                        continue;
                    }
                    self.state[r] = State::Active;

                    let pending: Vec<NodeId> = self.results[r]
                        .leaves
                        .iter()
                        .copied()
                        .filter(|&leaf| self.mapped(leaf).is_none())
                        .collect();
                    if !pending.is_empty() {
                        stack.extend(pending.into_iter().map(Task::Node));
                        continue;
                    }

                    self.instantiate(r);
                    self.state[r] = State::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    /// Copy a gate with its fanins remapped (all fanins must be mapped)
    fn copy_gate(&self, node: &Node) -> Node {
        let remap = |s: Signal| {
            self.mapped(s.node)
                .unwrap_or(Signal::FALSE)
                .invert_if(s.inverted)
        };
        match node {
            Node::And { left, right } => Node::And {
                left: remap(*left),
                right: remap(*right),
            },
            Node::Maj { a, b, c } => Node::Maj {
                a: remap(*a),
                b: remap(*b),
                c: remap(*c),
            },
            other => other.clone(),
        }
    }

    /// Add an improved result's logic, binding its roots
    fn instantiate(&mut self, r: usize) {
        let results = self.results;
        let result = &results[r];
        let optimized = &result.network;
        let mut local = vec![Signal::FALSE; optimized.size()];

        for (k, (id, _)) in optimized.inputs().into_iter().enumerate() {
            local[id.index()] = self.mapped(result.leaves[k]).unwrap_or(Signal::FALSE);
        }
        let remap = |local: &[Signal], s: Signal| local[s.node.index()].invert_if(s.inverted);
        for (id, node) in optimized.iter_gates() {
            local[id.index()] = match node {
                Node::And { left, right } => self
                    .new
                    .add_and(remap(&local, *left), remap(&local, *right)),
                Node::Maj { a, b, c } => self.new.add_maj(
                    remap(&local, *a),
                    remap(&local, *b),
                    remap(&local, *c),
                ),
                _ => continue,
            };
        }
        for (k, (_, s)) in optimized.outputs().iter().enumerate() {
            self.map[result.roots[k].index()] = Some(remap(&local, *s));
        }

        tracing::trace!(
            "Instantiated {} ({} gates)",
            result.group,
            optimized.num_gates()
        );
    }

    fn run(mut self) -> Result<Network, Failure> {
        let original = self.original;
        self.map[NodeId::CONST.index()] = Some(Signal::FALSE);

        for (id, node) in original.iter_nodes() {
            match node {
                Node::Input { name } => {
                    self.map[id.index()] = Some(Signal::new(self.new.add_input(name.clone())));
                }
                Node::Latch { name, init, .. } => {
                    self.map[id.index()] =
                        Some(Signal::new(self.new.add_latch(name.clone(), *init)));
                }
                _ => {}
            }
        }

        let verbatim: Vec<NodeId> = original
            .iter_gates()
            .map(|(id, _)| id)
            .filter(|&id| self.owner_of(id).is_none())
            .collect();
        for id in verbatim {
            self.ensure(id)?;
        }

        for (name, s) in original.outputs() {
            let signal = self.signal(*s)?;
            self.new.add_output(name.clone(), signal);
        }
        for (latch, _, data, _) in original.latches() {
            let signal = self.signal(data)?;
            let new_latch = self.signal(Signal::new(latch))?;
            self.new.set_latch_data(new_latch.node, signal)?;
        }

        Ok(self.new)
    }
}

/// Reassemble a network from per-group results.
///
/// Improved results that would close a cycle through other groups are
/// demoted in place: they get their extracted logic back and `improved`
/// is cleared.
pub fn assemble(
    original: &Network,
    view: &PartitionView<'_>,
    results: &mut [StrategyResult],
) -> Result<Network, AssembleError> {
    loop {
        let attempt = Assembler::new(original, view, results)?.run();
        match attempt {
            Ok(assembled) => {
                tracing::debug!(
                    "Assembled '{}': {} → {} gates",
                    assembled.name,
                    original.num_gates(),
                    assembled.num_gates()
                );
                return Ok(assembled);
            }
            Err(Failure::Cycle(r)) => {
                let result = &mut results[r];
                tracing::warn!(
                    "{} depends on itself through other groups, keeping original logic",
                    result.group
                );
                let sub = SubNetwork::extract(original, view, &result.group.region)?;
                result.network = sub.network;
                result.improved = false;
            }
            Err(Failure::Error(err)) => return Err(err),
        }
    }
}
