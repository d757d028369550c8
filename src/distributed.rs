//! Simulated distribution: a global matrix is split into contiguous row
//! blocks, one per rank, and every block is aggregated independently.
//!
//! Aggregation never crosses a rank boundary. The only coordination between
//! ranks happens after the per-rank passes, when rank-local aggregate ids are
//! shifted by the number of aggregates on lower ranks.

use std::ops::Range;

use rayon::prelude::*;
use sprs::TriMat;

use crate::graph::{Graph, LocalGraph};
use crate::params::AggregationParams;
use crate::uncoupled::{LocalAggregation, UncoupledAggregation};
use crate::{CsrMatrix, Error, Result};

/// Row ranges of a near-even split of `num_rows` rows over `num_ranks` ranks.
/// The first `num_rows % num_ranks` ranks get one extra row.
pub fn row_blocks(num_rows: usize, num_ranks: usize) -> Vec<Range<usize>> {
    let base = num_rows / num_ranks;
    let extra = num_rows % num_ranks;
    let mut start = 0;
    (0..num_ranks)
        .map(|rank| {
            let len = base + usize::from(rank < extra);
            let block = start..start + len;
            start += len;
            block
        })
        .collect()
}

pub fn split_rows(mat: &CsrMatrix, num_ranks: usize, drop_tolerance: f64) -> Result<Vec<LocalGraph>> {
    if num_ranks == 0 {
        return Err(Error::InvalidParameter {
            name: "num_ranks",
            message: "need at least one rank".into(),
        });
    }
    row_blocks(mat.rows(), num_ranks)
        .into_iter()
        .enumerate()
        .map(|(rank, rows)| LocalGraph::from_row_block(mat, rows, rank, drop_tolerance))
        .collect()
}

/// Aggregates of all ranks with globally unique ids.
#[derive(Clone, Debug)]
pub struct GlobalAggregation {
    pub ranks: Vec<LocalAggregation>,
    /// `agg_offsets[r]` is the first global aggregate id of rank `r`. Has one
    /// extra trailing entry holding the total.
    pub agg_offsets: Vec<usize>,
    pub vertex_to_agg_id: Vec<Option<usize>>,
    pub owner_rank: Vec<usize>,
}

impl GlobalAggregation {
    pub fn num_aggregates(&self) -> usize {
        self.agg_offsets.last().copied().unwrap_or(0)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_to_agg_id.len()
    }

    /// Global 0/1 prolongator, `num_vertices x num_aggregates`.
    pub fn tentative_prolongator(&self) -> CsrMatrix {
        let mut p = TriMat::new((self.num_vertices(), self.num_aggregates()));
        for (v, agg) in self.vertex_to_agg_id.iter().enumerate() {
            if let Some(agg) = agg {
                p.add_triplet(v, *agg, 1.0);
            }
        }
        p.to_csr::<usize>()
    }
}

/// Runs the uncoupled aggregation on every rank in parallel and stitches the
/// results together. The first rank error aborts the setup.
///
/// `graphs[r]` must be owned by rank `r`, and every global row must be owned
/// by exactly one graph.
pub fn aggregate_ranks(graphs: &[LocalGraph], params: &AggregationParams) -> Result<GlobalAggregation> {
    for (index, graph) in graphs.iter().enumerate() {
        if graph.owner_rank() != index {
            return Err(Error::InvalidParameter {
                name: "graphs",
                message: format!(
                    "graph at position {} is owned by rank {}",
                    index,
                    graph.owner_rank()
                ),
            });
        }
    }

    let driver = UncoupledAggregation::new(params.clone());
    let ranks: Vec<LocalAggregation> = graphs
        .par_iter()
        .map(|graph| driver.build(graph))
        .collect::<Result<Vec<_>>>()?;

    let mut agg_offsets = Vec::with_capacity(ranks.len() + 1);
    let mut total = 0;
    for rank in ranks.iter() {
        agg_offsets.push(total);
        total += rank.aggregates.aggregate_count();
    }
    agg_offsets.push(total);

    let num_global: usize = graphs.iter().map(|g| g.num_vertices()).sum();
    let mut vertex_to_agg_id = vec![None; num_global];
    let mut owner_rank = vec![0; num_global];
    let mut assigned = vec![false; num_global];

    for (index, (graph, local)) in graphs.iter().zip(ranks.iter()).enumerate() {
        let offset = agg_offsets[index];
        for (v, agg) in local.aggregates.vertex_to_agg_id().iter().enumerate() {
            let global = graph.col_map()[v];
            if global >= num_global {
                return Err(Error::DimensionMismatch {
                    expected: num_global,
                    found: global + 1,
                });
            }
            if assigned[global] {
                return Err(Error::InvalidParameter {
                    name: "graphs",
                    message: format!(
                        "global row {} is owned by ranks {} and {}",
                        global, owner_rank[global], index
                    ),
                });
            }
            assigned[global] = true;
            vertex_to_agg_id[global] = agg.map(|agg| agg + offset);
            owner_rank[global] = index;
        }
    }

    debug!(
        "{} ranks, {} vertices, {} aggregates",
        ranks.len(),
        num_global,
        total
    );

    Ok(GlobalAggregation {
        ranks,
        agg_offsets,
        vertex_to_agg_id,
        owner_rank,
    })
}
