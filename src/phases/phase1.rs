use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{check_inputs, AggregationAlgorithm};
use crate::aggregates::{Aggregates, VertexStatus};
use crate::graph::Graph;
use crate::params::{AggregationParams, Ordering};
use crate::Result;

/// Root based greedy aggregation.
///
/// A ready vertex becomes a root if it has enough ready on-rank neighbors to
/// reach `min_agg_size` and at most `max_selected_neighbors` of its neighbors
/// are already taken. The new aggregate holds the root plus its ready
/// neighbors in storage order, capped at `max_agg_size`. Vertices that fail
/// either test stay ready for the later phases.
#[derive(Copy, Clone, Debug, Default)]
pub struct Phase1;

impl Phase1 {
    fn visit_order(params: &AggregationParams, num_rows: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..num_rows).collect();
        if params.ordering == Ordering::Random {
            let mut rng = StdRng::seed_from_u64(params.seed);
            order.shuffle(&mut rng);
        }
        order
    }
}

impl AggregationAlgorithm for Phase1 {
    fn name(&self) -> &'static str {
        "Phase 1 (main)"
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

        let my_rank = graph.owner_rank();
        let max_agg_size = params.max_agg_size.unwrap_or(usize::MAX);
        let mut num_local_aggregates = aggregates.aggregate_count();
        let mut candidates: Vec<usize> = Vec::new();

        for root in Self::visit_order(params, graph.num_vertices()) {
            if status[root] != VertexStatus::Ready {
                continue;
            }

            candidates.clear();
            let mut num_aggregated_neighbors = 0;
            for &neigh in graph.neighbors(root) {
                if neigh == root || !graph.is_local_neighbor(neigh) {
                    continue;
                }
                match status[neigh] {
                    VertexStatus::Ready => {
                        if candidates.len() + 1 < max_agg_size && !candidates.contains(&neigh) {
                            candidates.push(neigh);
                        }
                    }
                    VertexStatus::Aggregated => num_aggregated_neighbors += 1,
                    VertexStatus::Ignored => {}
                }
            }

            if candidates.len() + 1 < params.min_agg_size
                || num_aggregated_neighbors > params.max_selected_neighbors
            {
                continue;
            }

            aggregates.set_is_root(root);
            for &v in candidates.iter().chain(std::iter::once(&root)) {
                aggregates.assign(v, num_local_aggregates, my_rank);
                status[v] = VertexStatus::Aggregated;
            }
            *num_non_aggregated -= candidates.len() + 1;
            num_local_aggregates += 1;
        }

        trace!(
            "rank {}: phase 1 built {} aggregates",
            my_rank,
            num_local_aggregates - aggregates.aggregate_count()
        );
        aggregates.set_aggregate_count(num_local_aggregates);
        Ok(())
    }
}
