use super::{check_inputs, AggregationAlgorithm};
use crate::aggregates::{Aggregates, VertexStatus};
use crate::graph::Graph;
use crate::params::AggregationParams;
use crate::{Error, Result};

/// Mop-up phase. Every vertex still ready after the earlier phases ends up in
/// an aggregate:
///
/// 1. if it has ready on-rank neighbors, all of them form a new aggregate
///    rooted at the vertex,
/// 2. otherwise it joins the aggregate of its first aggregated on-rank neighbor,
/// 3. otherwise it becomes a singleton, or the pass fails if
///    `error_on_isolated` is set.
///
/// Vertices are visited in index order and neighbors in storage order, so the
/// result depends on the adjacency ordering. Unlike Phase 1 the size of the
/// new aggregates is not bounded.
#[derive(Copy, Clone, Debug, Default)]
pub struct Phase3;

impl AggregationAlgorithm for Phase3 {
    fn name(&self) -> &'static str {
        "Phase 3 (cleanup)"
    }

    fn build_aggregates(
        &self,
        params: &AggregationParams,
        graph: &dyn Graph,
        aggregates: &mut Aggregates,
        status: &mut [VertexStatus],
        num_non_aggregated: &mut usize,
    ) -> Result<()> {
        check_inputs(graph, aggregates, status, *num_non_aggregated)?;

        let error_on_isolated = params.error_on_isolated;
        let num_rows = graph.num_vertices();
        let my_rank = graph.owner_rank();

        let mut num_local_aggregates = aggregates.aggregate_count();

        for i in 0..num_rows {
            if status[i] != VertexStatus::Ready {
                continue;
            }

            let neighbors = graph.neighbors(i);

            // try to avoid a singleton by pulling in every ready neighbor
            let mut is_new_aggregate = false;
            for &neigh in neighbors {
                if neigh != i
                    && graph.is_local_neighbor(neigh)
                    && status[neigh] == VertexStatus::Ready
                {
                    is_new_aggregate = true;
                    status[neigh] = VertexStatus::Aggregated;
                    aggregates.assign(neigh, num_local_aggregates, my_rank);
                    *num_non_aggregated -= 1;
                }
            }

            if is_new_aggregate {
                aggregates.set_is_root(i);
                aggregates.assign(i, num_local_aggregates, my_rank);
                num_local_aggregates += 1;
            } else {
                // i itself is still ready, so it can't match here
                let joined = neighbors
                    .iter()
                    .find(|&&neigh| {
                        graph.is_local_neighbor(neigh) && status[neigh] == VertexStatus::Aggregated
                    })
                    .and_then(|&neigh| aggregates.vertex_to_agg_id()[neigh]);

                match joined {
                    Some(agg_id) => aggregates.assign(i, agg_id, my_rank),
                    None if error_on_isolated => {
                        return Err(Error::IsolatedNode {
                            vertex: i,
                            rank: my_rank,
                        });
                    }
                    None => {
                        warn!("Found singleton: {}", i);
                        aggregates.set_is_root(i);
                        aggregates.assign(i, num_local_aggregates, my_rank);
                        num_local_aggregates += 1;
                    }
                }
            }

            status[i] = VertexStatus::Aggregated;
            *num_non_aggregated -= 1;
        }

        aggregates.set_aggregate_count(num_local_aggregates);
        Ok(())
    }
}
