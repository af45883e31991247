// ABOUTME: Dependency-graph grid layout used by gh_tidy_up and gh_put.
// ABOUTME: Columns follow longest-path depth; rows keep caller order.

use std::collections::{HashMap, HashSet};

use super::model::{Guid, Point};

/// Distances between layout cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub column: f64,
    pub row: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            column: 250.0,
            row: 120.0,
        }
    }
}

/// Place `nodes` on a grid anchored at `origin`.
///
/// `edges` are (upstream, downstream) pairs; edges touching nodes outside
/// `nodes` are ignored. A node's column is the length of the longest chain
/// of upstream nodes leading to it. Edges closing a cycle are ignored.
/// Returns one position per node, in the order of `nodes`.
pub fn grid_layout(
    nodes: &[Guid],
    edges: &[(Guid, Guid)],
    origin: Point,
    spacing: Spacing,
) -> Vec<(Guid, Point)> {
    let members: HashSet<Guid> = nodes.iter().copied().collect();
    let mut upstream: HashMap<Guid, Vec<Guid>> = HashMap::new();
    for (from, to) in edges {
        if from != to && members.contains(from) && members.contains(to) {
            upstream.entry(*to).or_default().push(*from);
        }
    }

    let mut depths: HashMap<Guid, usize> = HashMap::new();
    for node in nodes {
        let mut on_stack = HashSet::new();
        depth_of(*node, &upstream, &mut depths, &mut on_stack);
    }

    let mut rows: HashMap<usize, usize> = HashMap::new();
    nodes
        .iter()
        .map(|node| {
            let column = depths.get(node).copied().unwrap_or(0);
            let row = rows.entry(column).or_insert(0);
            let point = origin.offset(
                column as f64 * spacing.column,
                *row as f64 * spacing.row,
            );
            *row += 1;
            (*node, point)
        })
        .collect()
}

fn depth_of(
    node: Guid,
    upstream: &HashMap<Guid, Vec<Guid>>,
    depths: &mut HashMap<Guid, usize>,
    on_stack: &mut HashSet<Guid>,
) -> usize {
    if let Some(depth) = depths.get(&node) {
        return *depth;
    }
    on_stack.insert(node);

    let mut depth = 0;
    if let Some(parents) = upstream.get(&node) {
        for parent in parents {
            if on_stack.contains(parent) {
                continue;
            }
            depth = depth.max(depth_of(*parent, upstream, depths, on_stack) + 1);
        }
    }

    on_stack.remove(&node);
    depths.insert(node, depth);
    depth
}

/// Top-left corner of a set of points.
pub fn top_left(points: impl IntoIterator<Item = Point>) -> Option<Point> {
    points.into_iter().fold(None, |acc, p| match acc {
        None => Some(p),
        Some(min) => Some(Point::new(min.x.min(p.x), min.y.min(p.y))),
    })
}
