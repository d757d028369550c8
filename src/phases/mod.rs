//! Aggregation phases. Each phase takes the vertices still `Ready` and
//! aggregates (or ignores) some of them, updating the shared status array and
//! the count of vertices not yet aggregated.

use crate::aggregates::{Aggregates, VertexStatus};
use crate::graph::Graph;
use crate::params::AggregationParams;
use crate::{Error, Result};

mod dirichlet;
mod phase1;
mod phase3;

pub use dirichlet::PreserveDirichlet;
pub use phase1::Phase1;
pub use phase3::Phase3;

/// One aggregation phase.
///
/// `status` and `aggregates` must both hold one entry per graph vertex, and
/// `num_non_aggregated` must be at least the number of ready vertices. Phases
/// check both before touching anything.
pub trait AggregationAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn build_aggregates(
        &self,
        params: &AggregationParams,
        graph: &dyn Graph,
        aggregates: &mut Aggregates,
        status: &mut [VertexStatus],
        num_non_aggregated: &mut usize,
    ) -> Result<()>;
}

pub(crate) fn check_inputs(
    graph: &dyn Graph,
    aggregates: &Aggregates,
    status: &[VertexStatus],
    num_non_aggregated: usize,
) -> Result<()> {
    let num_rows = graph.num_vertices();
    for found in [status.len(), aggregates.num_vertices()] {
        if found != num_rows {
            return Err(Error::DimensionMismatch {
                expected: num_rows,
                found,
            });
        }
    }

    let ready = status
        .iter()
        .filter(|s| **s == VertexStatus::Ready)
        .count();
    if ready > num_non_aggregated {
        return Err(Error::CounterUnderflow {
            count: num_non_aggregated,
            ready,
        });
    }
    Ok(())
}
