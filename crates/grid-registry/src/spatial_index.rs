//! R-tree over cell bounding boxes, used to narrow point-in-cell searches.

use gw_common::BoundingBox;
use rstar::{RTree, RTreeObject, AABB};

/// Bounding box of one in-layer cell.
#[derive(Debug, Clone)]
struct CellEnvelope {
    cell: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over the cells of one grid layer.
#[derive(Debug)]
pub struct CellIndex {
    tree: RTree<CellEnvelope>,
    len: usize,
}

impl CellIndex {
    /// Bulk-load the index from per-cell bounding boxes; position is the cell id.
    pub fn build<I>(boxes: I) -> Self
    where
        I: IntoIterator<Item = BoundingBox>,
    {
        let envelopes: Vec<CellEnvelope> = boxes
            .into_iter()
            .enumerate()
            .map(|(cell, bbox)| CellEnvelope {
                cell,
                envelope: AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]),
            })
            .collect();
        let len = envelopes.len();

        Self {
            tree: RTree::bulk_load(envelopes),
            len,
        }
    }

    /// Cells whose bounding box contains the point, in ascending order.
    pub fn candidates(&self, x: f64, y: f64) -> Vec<usize> {
        let point = AABB::from_point([x, y]);
        let mut cells: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&point)
            .map(|e| e.cell)
            .collect();
        cells.sort_unstable();
        cells
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
