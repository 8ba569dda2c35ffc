//! Partition Combiner
//!
//! Merges adjacent partitions carrying the same label into one optimization
//! unit, so rewriting can work across their shared boundary. Merging is the
//! connected components of the "adjacent and same label" relation, found
//! with a union-find over partition indices. SKIP partitions are never
//! merged.

use indexmap::IndexMap;
use mixsyn_ml::Label;
use mixsyn_net::{PartitionId, PartitionView, Region};

/// A set of partitions optimized together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Partitions in the group
    pub region: Region,
    /// Label shared by every partition in the group
    pub label: Label,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.region)
    }
}

/// Union-find over arena indices
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Group the partitions of a view.
///
/// With `enabled` unset every partition forms its own group. Partitions
/// without a label are treated as SKIP. Groups are ordered by their
/// smallest partition ID.
pub fn combine(
    view: &PartitionView<'_>,
    labels: &IndexMap<PartitionId, Label>,
    enabled: bool,
) -> Vec<Group> {
    let ids = view.partition_ids();
    let label_of = |id: PartitionId| labels.get(&id).copied().unwrap_or(Label::Skip);
    let index: IndexMap<PartitionId, usize> =
        ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut sets = DisjointSets::new(ids.len());
    if enabled {
        for (i, &id) in ids.iter().enumerate() {
            let label = label_of(id);
            if label.is_skip() {
                continue;
            }
            for other in view.adjacent(id).into_iter().flatten() {
                if label_of(*other) != label {
                    continue;
                }
                if let Some(&j) = index.get(other) {
                    sets.union(i, j);
                }
            }
        }
    }

    let mut members: IndexMap<usize, Vec<PartitionId>> = IndexMap::new();
    for (i, &id) in ids.iter().enumerate() {
        let root = sets.find(i);
        members.entry(root).or_default().push(id);
    }

    // ids are ascending, so groups come out ordered by their first member
    let groups: Vec<Group> = members
        .into_values()
        .map(|partitions| Group {
            label: label_of(partitions[0]),
            region: Region::new(partitions),
        })
        .collect();

    if enabled {
        for group in groups.iter().filter(|g| g.region.len() > 1) {
            tracing::debug!("Combined {}", group);
        }
    }
    groups
}
