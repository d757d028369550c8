use crate::aggregates::{Aggregates, VertexStatus};
use crate::graph::Graph;
use crate::params::AggregationParams;
use crate::phases::{AggregationAlgorithm, Phase1, Phase3, PreserveDirichlet};
use crate::{Error, Result};

/// Aggregation of the vertices owned by one rank.
#[derive(Clone, Debug)]
pub struct LocalAggregation {
    pub rank: usize,
    pub aggregates: Aggregates,
    pub status: Vec<VertexStatus>,
}

impl LocalAggregation {
    pub fn num_ignored(&self) -> usize {
        self.status
            .iter()
            .filter(|s| **s == VertexStatus::Ignored)
            .count()
    }
}

/// Runs a pipeline of aggregation phases over one rank-local graph.
pub struct UncoupledAggregation {
    params: AggregationParams,
    phases: Vec<Box<dyn AggregationAlgorithm>>,
}

impl UncoupledAggregation {
    /// The default pipeline: Dirichlet handling, root based aggregation and the
    /// mop-up phase.
    pub fn new(params: AggregationParams) -> Self {
        Self {
            params,
            phases: vec![
                Box::new(PreserveDirichlet),
                Box::new(Phase1),
                Box::new(Phase3),
            ],
        }
    }

    pub fn with_phases(mut self, phases: Vec<Box<dyn AggregationAlgorithm>>) -> Self {
        self.phases = phases;
        self
    }

    pub fn build(&self, graph: &dyn Graph) -> Result<LocalAggregation> {
        self.params.validate()?;

        let rank = graph.owner_rank();
        let num_rows = graph.num_vertices();
        let mut aggregates = Aggregates::new(num_rows);
        let mut status = vec![VertexStatus::Ready; num_rows];
        let mut num_non_aggregated = num_rows;

        for phase in self.phases.iter() {
            phase.build_aggregates(
                &self.params,
                graph,
                &mut aggregates,
                &mut status,
                &mut num_non_aggregated,
            )?;
            debug!(
                "rank {}: after {}: {} aggregates, {} vertices left",
                rank,
                phase.name(),
                aggregates.aggregate_count(),
                num_non_aggregated
            );
        }

        if num_non_aggregated > 0 {
            return Err(Error::UnaggregatedNodes {
                rank,
                count: num_non_aggregated,
            });
        }

        let result = LocalAggregation {
            rank,
            aggregates,
            status,
        };
        info!(
            "rank {}: {} vertices in {} aggregates ({} singletons), {} ignored",
            rank,
            num_rows,
            result.aggregates.aggregate_count(),
            result.aggregates.num_singletons(),
            result.num_ignored()
        );
        Ok(result)
    }
}

#[cfg(test)]
extern crate test_generator;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LocalGraph;
    use test_generator::test_resources;

    fn check_invariants(graph: &LocalGraph, result: &LocalAggregation) {
        let aggregates = &result.aggregates;
        let sizes = aggregates.aggregate_sizes();
        assert!(sizes.iter().all(|size| *size > 0));

        for v in 0..graph.num_vertices() {
            match result.status[v] {
                VertexStatus::Ready => panic!("vertex {} left ready", v),
                VertexStatus::Ignored => {
                    assert!(graph.is_boundary(v));
                    assert_eq!(aggregates.vertex_to_agg_id()[v], None);
                }
                VertexStatus::Aggregated => {
                    let agg = aggregates.vertex_to_agg_id()[v].unwrap();
                    assert!(agg < aggregates.aggregate_count());
                    assert_eq!(aggregates.proc_winner()[v], Some(graph.owner_rank()));
                }
            }
        }

        // one root per aggregate
        let mut roots = vec![0; aggregates.aggregate_count()];
        for v in 0..graph.num_vertices() {
            if aggregates.is_root(v) {
                roots[aggregates.vertex_to_agg_id()[v].unwrap()] += 1;
            }
        }
        assert!(roots.iter().all(|r| *r == 1));
    }

    #[test_resources("test_matrices/unit_tests/*")]
    fn aggregates_cover_matrix_graph(mat_path: &str) {
        let mat = sprs::io::read_matrix_market::<f64, usize, _>(mat_path)
            .unwrap()
            .to_csr::<usize>();
        let graph = LocalGraph::from_matrix(&mat, 0.0).unwrap();

        for params in [
            AggregationParams::default(),
            AggregationParams {
                max_agg_size: Some(3),
                ..Default::default()
            },
            AggregationParams {
                preserve_dirichlet: true,
                ordering: crate::params::Ordering::Random,
                seed: 11,
                ..Default::default()
            },
        ] {
            let result = UncoupledAggregation::new(params).build(&graph).unwrap();
            check_invariants(&graph, &result);
        }
    }

    #[test_resources("test_matrices/unit_tests/*")]
    fn partition_times_ones_is_ones(mat_path: &str) {
        let mat = sprs::io::read_matrix_market::<f64, usize, _>(mat_path)
            .unwrap()
            .to_csr::<usize>();
        let graph = LocalGraph::from_matrix(&mat, 0.0).unwrap();
        let result = UncoupledAggregation::new(AggregationParams::default())
            .build(&graph)
            .unwrap();

        let p = result.aggregates.tentative_prolongator();
        let row_sums: Vec<f64> = p
            .outer_iterator()
            .map(|row_vec| row_vec.data().iter().sum())
            .collect();
        assert_eq!(row_sums.len(), graph.num_vertices());
        for (v, sum) in row_sums.iter().enumerate() {
            let expected = match result.status[v] {
                VertexStatus::Ignored => 0.0,
                _ => 1.0,
            };
            assert!((sum - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn path_graph_pipeline() {
        // 0 and 7 are Dirichlet rows
        let adjacency: Vec<Vec<usize>> = (0..8)
            .map(|i| match i {
                0 | 7 => vec![i],
                _ => vec![i - 1, i, i + 1],
            })
            .collect();
        let graph = LocalGraph::from_adjacency(&adjacency);
        let result = UncoupledAggregation::new(AggregationParams::default())
            .build(&graph)
            .unwrap();

        assert_eq!(result.num_ignored(), 2);
        // phase 1 roots at 1 {1, 2} and 4 {3, 4, 5}; phase 3 joins 6 to the second
        assert_eq!(
            result.aggregates.vertex_to_agg_id(),
            &[None, Some(0), Some(0), Some(1), Some(1), Some(1), Some(1), None]
        );
        check_invariants(&graph, &result);
    }

    #[test]
    fn isolated_vertex_fails_setup_on_request() {
        // 1 only couples to a ghost, so it is neither Dirichlet nor aggregatable
        let graph = LocalGraph::from_adjacency_on_rank(&[vec![0, 2], vec![1, 3], vec![2, 0]], 4);
        let params = AggregationParams {
            error_on_isolated: true,
            ..Default::default()
        };
        let err = UncoupledAggregation::new(params).build(&graph).unwrap_err();
        assert_eq!(err, Error::IsolatedNode { vertex: 1, rank: 4 });

        let result = UncoupledAggregation::new(AggregationParams::default())
            .build(&graph)
            .unwrap();
        assert_eq!(result.aggregates.num_singletons(), 1);
    }

    #[test]
    fn pipeline_without_mop_up_reports_leftovers() {
        // only {0, 1, 2} is big enough, 3 is left for a mop-up phase
        let graph = LocalGraph::from_adjacency(&[vec![1], vec![0, 2], vec![1, 3], vec![2]]);
        let params = AggregationParams {
            min_agg_size: 3,
            ..Default::default()
        };
        let err = UncoupledAggregation::new(params)
            .with_phases(vec![Box::new(Phase1)])
            .build(&graph)
            .unwrap_err();
        assert_eq!(err, Error::UnaggregatedNodes { rank: 0, count: 1 });
    }
}
