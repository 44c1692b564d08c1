//! Foreign-key graph and join-path inference.
//!
//! Tables are nodes and declared column pairs are edges. Every link is
//! stored in both directions, so a path can be walked from either end.
//! [`JoinGraph::minimal_joins`] turns shortest paths into JOIN items,
//! sharing path prefixes between targets.

use crate::condition::Condition;
use crate::error::{JoinError, JoinResult};
use crate::expr::{Column, Table};
use crate::query::JoinItem;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

/// One declared column pair from one table to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Column on the side the link is stored under
    pub source: Column,
    /// Column on the neighbouring table
    pub target: Column,
}

impl Link {
    /// `source = target`
    pub fn condition(&self) -> Condition {
        self.source.eq(&self.target)
    }

    fn same_columns(&self, source: &Column, target: &Column) -> bool {
        self.source.name() == source.name() && self.target.name() == target.name()
    }

    fn describe(&self) -> String {
        format!(
            "{} = {}",
            self.source.qualified_name(),
            self.target.qualified_name()
        )
    }
}

/// Seed tuple `(from_table, from_column, to_table, to_column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKey {
    /// Referencing table
    pub from_table: String,
    /// Referencing column
    pub from_column: String,
    /// Referenced table
    pub to_table: String,
    /// Referenced column
    pub to_column: String,
}

impl ForeignKey {
    /// Build a seed tuple
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
        }
    }
}

/// Adjacency map `table -> neighbour -> links`, in insertion order.
///
/// Build it once and share it read-only; mutation needs `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct JoinGraph {
    edges: IndexMap<Table, IndexMap<Table, Vec<Link>>>,
}

fn owner(column: &Column) -> &Table {
    match column.table() {
        Some(table) => table,
        None => panic!("join graph links need table-bound columns, got {}", column.name()),
    }
}

impl JoinGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph seeded from foreign-key tuples
    pub fn from_foreign_keys<'a>(keys: impl IntoIterator<Item = &'a ForeignKey>) -> Self {
        let mut graph = Self::new();
        for key in keys {
            let from = Table::new(key.from_table.as_str()).untyped_column(key.from_column.as_str());
            let to = Table::new(key.to_table.as_str()).untyped_column(key.to_column.as_str());
            graph.add_link(&from, &to);
        }
        graph
    }

    /// Declare `source = target`, stored in both directions.
    ///
    /// Declaring the same column pair twice is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if either column is not bound to a table.
    pub fn add_link(&mut self, source: &Column, target: &Column) -> &mut Self {
        self.insert(source, target);
        self.insert(target, source);
        trace!(
            source = %source.qualified_name(),
            target = %target.qualified_name(),
            "Added join link"
        );
        self
    }

    fn insert(&mut self, source: &Column, target: &Column) {
        let links = self
            .edges
            .entry(owner(source).clone())
            .or_default()
            .entry(owner(target).clone())
            .or_default();
        if !links.iter().any(|link| link.same_columns(source, target)) {
            links.push(Link {
                source: source.clone(),
                target: target.clone(),
            });
        }
    }

    /// Remove `source = target` in both directions, dropping emptied entries.
    ///
    /// # Panics
    ///
    /// Panics if either column is not bound to a table.
    pub fn remove_link(&mut self, source: &Column, target: &Column) -> &mut Self {
        self.delete(source, target);
        self.delete(target, source);
        self
    }

    fn delete(&mut self, source: &Column, target: &Column) {
        let (from, to) = (owner(source), owner(target));
        let Some(neighbours) = self.edges.get_mut(from) else {
            return;
        };
        if let Some(links) = neighbours.get_mut(to) {
            links.retain(|link| !link.same_columns(source, target));
            if links.is_empty() {
                neighbours.shift_remove(to);
            }
        }
        if neighbours.is_empty() {
            self.edges.shift_remove(from);
        }
    }

    /// Remove a table and every link touching it
    pub fn remove_table(&mut self, table: &Table) -> &mut Self {
        self.edges.shift_remove(table);
        for neighbours in self.edges.values_mut() {
            neighbours.shift_remove(table);
        }
        self.edges.retain(|_, neighbours| !neighbours.is_empty());
        self
    }

    /// Tables with at least one link
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.edges.keys()
    }

    /// Tables directly linked to `table`
    pub fn neighbours(&self, table: &Table) -> impl Iterator<Item = &Table> {
        self.edges.get(table).into_iter().flat_map(|n| n.keys())
    }

    /// Links stored from `from` to `to`
    pub fn links_between(&self, from: &Table, to: &Table) -> &[Link] {
        self.edges
            .get(from)
            .and_then(|neighbours| neighbours.get(to))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the graph has no links
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Shortest-path predecessor of every table reachable from `source`,
    /// keyed by table index. Every edge weighs 1.
    fn predecessors(&self, source: &Table) -> HashMap<usize, usize> {
        let mut prev = HashMap::new();
        let Some(start) = self.edges.get_index_of(source) else {
            return prev;
        };

        let mut dist = vec![usize::MAX; self.edges.len()];
        dist[start] = 0;
        let mut queue: BinaryHeap<Reverse<(usize, usize)>> = BinaryHeap::new();
        queue.push(Reverse((0, start)));

        while let Some(Reverse((d, idx))) = queue.pop() {
            if d > dist[idx] {
                continue;
            }
            let Some((_, neighbours)) = self.edges.get_index(idx) else {
                continue;
            };
            for neighbour in neighbours.keys() {
                let Some(next) = self.edges.get_index_of(neighbour) else {
                    continue;
                };
                if d + 1 < dist[next] {
                    dist[next] = d + 1;
                    prev.insert(next, idx);
                    queue.push(Reverse((d + 1, next)));
                }
            }
        }
        prev
    }

    /// Join items connecting `source` to every table in `targets`.
    ///
    /// Each target contributes the tables on its shortest path that earlier
    /// targets have not already brought in, ordered from `source` outward.
    /// Fails without partial output when a target is unreachable or a hop is
    /// linked by more than one column pair.
    pub fn minimal_joins(&self, source: &Table, targets: &[Table]) -> JoinResult<Vec<JoinItem>> {
        if targets.is_empty() {
            return Err(JoinError::NoTargets);
        }

        let prev = self.predecessors(source);
        debug!(
            source = source.reference_name(),
            targets = targets.len(),
            reachable = prev.len(),
            "Computed shortest-path tree"
        );

        let mut included: HashSet<&Table> = HashSet::from([source]);
        let mut items = Vec::new();

        for target in targets {
            let mut chain = Vec::new();
            let mut current = target;

            while current != source && !included.contains(current) {
                let parent = self
                    .edges
                    .get_index_of(current)
                    .and_then(|idx| prev.get(&idx))
                    .and_then(|&idx| self.edges.get_index(idx))
                    .map(|(table, _)| table);

                let Some(parent) = parent else {
                    let path = chain
                        .iter()
                        .map(|item: &JoinItem| item.target.reference_name().to_string())
                        .collect();
                    return Err(JoinError::unreachable(
                        source.reference_name(),
                        target.reference_name(),
                        current.reference_name(),
                        path,
                    ));
                };

                let links = self.links_between(parent, current);
                let [link] = links else {
                    return Err(JoinError::AmbiguousLink {
                        from: parent.reference_name().to_string(),
                        to: current.reference_name().to_string(),
                        candidates: links.iter().map(Link::describe).collect(),
                    });
                };

                chain.push(JoinItem::new(current, link.condition()));
                included.insert(current);
                current = parent;
            }

            debug!(
                target = target.reference_name(),
                added = chain.len(),
                "Resolved join path"
            );
            chain.reverse();
            items.extend(chain);
        }

        Ok(items)
    }
}
