use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distributed::GlobalAggregation;
use crate::uncoupled::LocalAggregation;
use crate::Result;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RankData {
    pub rank: usize,
    pub num_vertices: usize,
    pub num_aggregates: usize,
    pub num_ignored: usize,
    pub num_singletons: usize,
    pub aggregate_sizes: Vec<usize>,
    pub roots: Vec<usize>,
}

impl From<&LocalAggregation> for RankData {
    fn from(value: &LocalAggregation) -> Self {
        let aggregates = &value.aggregates;
        RankData {
            rank: value.rank,
            num_vertices: aggregates.num_vertices(),
            num_aggregates: aggregates.aggregate_count(),
            num_ignored: value.num_ignored(),
            num_singletons: aggregates.num_singletons(),
            aggregate_sizes: aggregates.aggregate_sizes(),
            roots: (0..aggregates.num_vertices())
                .filter(|v| aggregates.is_root(*v))
                .collect(),
        }
    }
}

/// Report of a full (possibly multi-rank) aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AggregationReport {
    pub matrix: String,
    pub num_vertices: usize,
    pub num_aggregates: usize,
    pub coarsening_factor: f64,
    pub ranks: Vec<RankData>,
    /// Global aggregate id per vertex, `None` for ignored vertices.
    pub vertex_to_agg_id: Vec<Option<usize>>,
}

impl AggregationReport {
    pub fn new(matrix: &str, global: &GlobalAggregation) -> Self {
        let num_vertices = global.num_vertices();
        let num_aggregates = global.num_aggregates();
        AggregationReport {
            matrix: matrix.to_string(),
            num_vertices,
            num_aggregates,
            coarsening_factor: if num_aggregates == 0 {
                0.0
            } else {
                num_vertices as f64 / num_aggregates as f64
            },
            ranks: global.ranks.iter().map(RankData::from).collect(),
            vertex_to_agg_id: global.vertex_to_agg_id.clone(),
        }
    }
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, data: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::{aggregate_ranks, split_rows};
    use crate::params::AggregationParams;
    use sprs::TriMat;

    #[test]
    fn report_round_trips_through_json() {
        let n = 9;
        let mut mat = TriMat::new((n, n));
        for i in 0..n {
            mat.add_triplet(i, i, 2.0);
            if i > 0 {
                mat.add_triplet(i, i - 1, -1.0);
                mat.add_triplet(i - 1, i, -1.0);
            }
        }
        let graphs = split_rows(&mat.to_csr::<usize>(), 2, 0.0).unwrap();
        let global = aggregate_ranks(&graphs, &AggregationParams::default()).unwrap();
        let report = AggregationReport::new("chain", &global);

        assert_eq!(report.ranks.len(), 2);
        assert_eq!(
            report.ranks.iter().map(|r| r.num_vertices).sum::<usize>(),
            n
        );
        assert_eq!(
            report.ranks.iter().map(|r| r.num_aggregates).sum::<usize>(),
            report.num_aggregates
        );
        for rank in report.ranks.iter() {
            assert_eq!(rank.roots.len(), rank.num_aggregates);
        }

        let path = std::env::temp_dir().join("amg_agg_report_test.json");
        write_json(&path, &report).unwrap();
        let read: AggregationReport =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(read.ranks, report.ranks);
        assert_eq!(read.vertex_to_agg_id, report.vertex_to_agg_id);
        assert!((read.coarsening_factor - report.coarsening_factor).abs() < 1e-12);
        std::fs::remove_file(&path).unwrap();
    }
}
