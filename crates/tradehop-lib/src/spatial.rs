//! KD-tree spatial index for "systems within N light-years" queries.
//!
//! The index is built once when a [`TradeDb`](crate::db::TradeDb) is assembled
//! and answers radius queries in O(log n) average time. Coordinates are stored
//! as `f32` for compactness; candidates are re-checked against the exact `f64`
//! positions so that range boundaries are not blurred by rounding.

use std::fmt;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::db::{System, SystemId, SystemPosition};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Relative slack applied to the `f32` query radius before the exact re-check.
const RADIUS_SLACK: f64 = 1e-4;

#[derive(Debug, Clone, Copy)]
struct IndexNode {
    system_id: SystemId,
    position: SystemPosition,
}

/// Spatial index over system positions.
pub struct SpatialIndex {
    tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32>,
    nodes: Vec<IndexNode>,
}

impl SpatialIndex {
    /// Build an index over the given systems.
    pub fn build<'a>(systems: impl IntoIterator<Item = &'a System>) -> Self {
        let nodes: Vec<IndexNode> = systems
            .into_iter()
            .map(|system| IndexNode {
                system_id: system.id,
                position: system.position,
            })
            .collect();

        let mut tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (index, node) in nodes.iter().enumerate() {
            tree.add(&to_coords(&node.position), index);
        }

        debug!(node_count = nodes.len(), "built spatial index");

        Self { tree, nodes }
    }

    /// Number of indexed systems.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find all systems within a radius of a point.
    ///
    /// Returns (SystemId, distance) pairs sorted by distance, then identifier.
    pub fn within_radius(&self, point: &SystemPosition, radius: f64) -> Vec<(SystemId, f64)> {
        if radius <= 0.0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let padded = radius * (1.0 + RADIUS_SLACK) + RADIUS_SLACK;
        let squared_radius = (padded * padded) as f32;
        let candidates = self
            .tree
            .within::<SquaredEuclidean>(&to_coords(point), squared_radius);

        let mut neighbours: Vec<(SystemId, f64)> = candidates
            .into_iter()
            .filter_map(|neighbour| {
                let node = &self.nodes[neighbour.item];
                let distance = point.distance_to(&node.position);
                (distance <= radius).then_some((node.system_id, distance))
            })
            .collect();

        neighbours.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        neighbours
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

fn to_coords(position: &SystemPosition) -> [f32; 3] {
    [position.x as f32, position.y as f32, position.z as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(id: SystemId, x: f64) -> System {
        System {
            id,
            name: format!("S{id}"),
            position: SystemPosition::new(x, 0.0, 0.0),
            stations: Vec::new(),
        }
    }

    #[test]
    fn radius_query_includes_boundary_and_sorts_by_distance() {
        let systems = vec![system(1, 0.0), system(2, 7.5), system(3, 2.0), system(4, 7.6)];
        let index = SpatialIndex::build(&systems);
        assert_eq!(index.len(), 4);

        let hits = index.within_radius(&SystemPosition::new(0.0, 0.0, 0.0), 7.5);
        let ids: Vec<SystemId> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn empty_index_and_zero_radius_return_nothing() {
        let empty = SpatialIndex::build(&Vec::<System>::new());
        assert!(empty.is_empty());
        assert!(empty
            .within_radius(&SystemPosition::new(0.0, 0.0, 0.0), 10.0)
            .is_empty());

        let systems = vec![system(1, 0.0)];
        let index = SpatialIndex::build(&systems);
        assert!(index
            .within_radius(&SystemPosition::new(0.0, 0.0, 0.0), 0.0)
            .is_empty());
    }
}
