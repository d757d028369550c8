use serde::{Deserialize, Serialize};
use sprs::TriMat;
use strum_macros::Display;

use crate::CsrMatrix;

/// Aggregation state of a single vertex. Shared by all phases of a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum VertexStatus {
    Ready,
    Aggregated,
    /// Excluded from aggregation, e.g. a Dirichlet row.
    Ignored,
}

/// Aggregate membership of the vertices owned by one rank.
///
/// Ids are rank-local and dense: `0..aggregate_count()`. The container is
/// filled in place by successive aggregation phases.
#[derive(Clone, Debug)]
pub struct Aggregates {
    vertex_to_agg_id: Vec<Option<usize>>,
    proc_winner: Vec<Option<usize>>,
    is_root: Vec<bool>,
    num_aggregates: usize,
}

impl Aggregates {
    pub fn new(num_vertices: usize) -> Self {
        Self {
            vertex_to_agg_id: vec![None; num_vertices],
            proc_winner: vec![None; num_vertices],
            is_root: vec![false; num_vertices],
            num_aggregates: 0,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_to_agg_id.len()
    }

    pub fn aggregate_count(&self) -> usize {
        self.num_aggregates
    }

    pub fn set_aggregate_count(&mut self, count: usize) {
        self.num_aggregates = count;
    }

    pub fn vertex_to_agg_id(&self) -> &[Option<usize>] {
        &self.vertex_to_agg_id
    }

    pub fn proc_winner(&self) -> &[Option<usize>] {
        &self.proc_winner
    }

    /// Marks `v` as the seed of its aggregate. Only used for diagnostics.
    pub fn set_is_root(&mut self, v: usize) {
        self.is_root[v] = true;
    }

    pub fn is_root(&self, v: usize) -> bool {
        self.is_root[v]
    }

    /// Puts `v` into aggregate `agg_id` on behalf of `rank`.
    pub fn assign(&mut self, v: usize, agg_id: usize, rank: usize) {
        self.vertex_to_agg_id[v] = Some(agg_id);
        self.proc_winner[v] = Some(rank);
    }

    /// Number of vertices in each aggregate.
    pub fn aggregate_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_aggregates];
        for agg in self.vertex_to_agg_id.iter().flatten() {
            sizes[*agg] += 1;
        }
        sizes
    }

    /// Vertices of each aggregate, in increasing vertex order.
    pub fn agg_to_nodes(&self) -> Vec<Vec<usize>> {
        let mut agg_to_nodes = vec![Vec::new(); self.num_aggregates];
        for (v, agg) in self.vertex_to_agg_id.iter().enumerate() {
            if let Some(agg) = agg {
                agg_to_nodes[*agg].push(v);
            }
        }
        agg_to_nodes
    }

    pub fn num_singletons(&self) -> usize {
        self.aggregate_sizes().iter().filter(|size| **size == 1).count()
    }

    /// Unsmoothed 0/1 interpolation from aggregates to vertices. Vertices
    /// without an aggregate get an empty row.
    pub fn tentative_prolongator(&self) -> CsrMatrix {
        let mut p = TriMat::new((self.num_vertices(), self.num_aggregates));
        for (v, agg) in self.vertex_to_agg_id.iter().enumerate() {
            if let Some(agg) = agg {
                p.add_triplet(v, *agg, 1.0);
            }
        }
        p.to_csr::<usize>()
    }
}
