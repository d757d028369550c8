use super::{check_inputs, AggregationAlgorithm};
use crate::aggregates::{Aggregates, VertexStatus};
use crate::graph::Graph;
use crate::params::AggregationParams;
use crate::Result;

/// Takes Dirichlet rows out of the pool. They either become singleton
/// aggregates (`preserve_dirichlet`) or are ignored for the rest of the setup.
#[derive(Copy, Clone, Debug, Default)]
pub struct PreserveDirichlet;

impl AggregationAlgorithm for PreserveDirichlet {
    fn name(&self) -> &'static str {
        "Preserve Dirichlet"
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
        let mut num_local_aggregates = aggregates.aggregate_count();

        for v in 0..graph.num_vertices() {
            if status[v] != VertexStatus::Ready || !graph.is_boundary(v) {
                continue;
            }

            if params.preserve_dirichlet {
                aggregates.set_is_root(v);
                aggregates.assign(v, num_local_aggregates, my_rank);
                num_local_aggregates += 1;
                status[v] = VertexStatus::Aggregated;
            } else {
                status[v] = VertexStatus::Ignored;
            }
            *num_non_aggregated -= 1;
        }

        aggregates.set_aggregate_count(num_local_aggregates);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::VertexStatus::{Aggregated, Ignored, Ready};
    use crate::graph::LocalGraph;

    fn graph() -> LocalGraph {
        // 0 and 3 only see themselves
        LocalGraph::from_adjacency(&[vec![0], vec![1, 2], vec![1, 2], vec![3]])
    }

    #[test]
    fn boundary_rows_are_ignored_by_default() {
        let mut aggregates = Aggregates::new(4);
        let mut status = vec![Ready; 4];
        let mut num_non_aggregated = 4;
        PreserveDirichlet
            .build_aggregates(
                &AggregationParams::default(),
                &graph(),
                &mut aggregates,
                &mut status,
                &mut num_non_aggregated,
            )
            .unwrap();

        assert_eq!(status, vec![Ignored, Ready, Ready, Ignored]);
        assert_eq!(num_non_aggregated, 2);
        assert_eq!(aggregates.aggregate_count(), 0);
        assert_eq!(aggregates.vertex_to_agg_id()[0], None);
    }

    #[test]
    fn preserved_boundary_rows_are_singletons() {
        let params = AggregationParams {
            preserve_dirichlet: true,
            ..Default::default()
        };
        let mut aggregates = Aggregates::new(4);
        aggregates.set_aggregate_count(1);
        let mut status = vec![Ready; 4];
        let mut num_non_aggregated = 4;
        PreserveDirichlet
            .build_aggregates(
                &params,
                &graph(),
                &mut aggregates,
                &mut status,
                &mut num_non_aggregated,
            )
            .unwrap();

        assert_eq!(status, vec![Aggregated, Ready, Ready, Aggregated]);
        assert_eq!(num_non_aggregated, 2);
        assert_eq!(aggregates.aggregate_count(), 3);
        assert_eq!(aggregates.vertex_to_agg_id()[0], Some(1));
        assert_eq!(aggregates.vertex_to_agg_id()[3], Some(2));
        assert!(aggregates.is_root(3));
    }
}
