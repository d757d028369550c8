//! Rank-local adjacency graphs.
//!
//! Column indices follow the usual "locals first, then ghosts" numbering: a
//! neighbor index `j` of a rank with `n` owned rows refers to an owned vertex
//! iff `j < n`. Ghost columns (rows owned by another rank) are numbered
//! `n, n + 1, ...` in the order they are first seen while scanning the rows.

use std::ops::Range;

use indexmap::IndexSet;

use crate::{CsrMatrix, Error, Result};

/// Read-only view of a rank-local graph, as consumed by the aggregation phases.
pub trait Graph {
    /// Number of locally owned vertices.
    fn num_vertices(&self) -> usize;

    /// Neighbors of `v` in storage order. May contain `v` itself and ghost
    /// indices.
    fn neighbors(&self, v: usize) -> &[usize];

    /// Whether a neighbor index refers to a locally owned vertex.
    fn is_local_neighbor(&self, j: usize) -> bool;

    /// Rank owning this piece of the graph.
    fn owner_rank(&self) -> usize;

    /// Whether `v` is a Dirichlet (boundary) row.
    fn is_boundary(&self, _v: usize) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct LocalGraph {
    rank: usize,
    num_local: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    col_map: Vec<usize>,
    boundary: Vec<bool>,
}

impl LocalGraph {
    /// Builds a single-rank graph from neighbor lists. Indices `>= adjacency.len()`
    /// are treated as ghosts. A vertex with no neighbor other than itself is a
    /// boundary vertex.
    pub fn from_adjacency(adjacency: &[Vec<usize>]) -> Self {
        Self::from_adjacency_on_rank(adjacency, 0)
    }

    pub fn from_adjacency_on_rank(adjacency: &[Vec<usize>], rank: usize) -> Self {
        let num_local = adjacency.len();
        let mut row_offsets = Vec::with_capacity(num_local + 1);
        let mut col_indices = Vec::new();
        let mut boundary = Vec::with_capacity(num_local);
        row_offsets.push(0);

        for (i, neighbors) in adjacency.iter().enumerate() {
            col_indices.extend_from_slice(neighbors);
            row_offsets.push(col_indices.len());
            boundary.push(neighbors.iter().all(|j| *j == i));
        }

        let num_cols = col_indices
            .iter()
            .max()
            .map_or(num_local, |max| num_local.max(max + 1));

        Self {
            rank,
            num_local,
            row_offsets,
            col_indices,
            col_map: (0..num_cols).collect(),
            boundary,
        }
    }

    /// Builds the graph of a square matrix owned entirely by rank 0.
    pub fn from_matrix(mat: &CsrMatrix, drop_tolerance: f64) -> Result<Self> {
        Self::from_row_block(mat, 0..mat.rows(), 0, drop_tolerance)
    }

    /// Builds the graph of the rows `rows` of a square matrix, as seen by `rank`.
    ///
    /// Off-diagonal entries with magnitude `<= drop_tolerance` are not edges.
    /// The diagonal is always kept. Rows without any surviving off-diagonal
    /// entry, local or ghost, are flagged as boundary rows.
    pub fn from_row_block(
        mat: &CsrMatrix,
        rows: Range<usize>,
        rank: usize,
        drop_tolerance: f64,
    ) -> Result<Self> {
        if mat.rows() != mat.cols() {
            return Err(Error::DimensionMismatch {
                expected: mat.rows(),
                found: mat.cols(),
            });
        }
        if !mat.is_csr() {
            return Err(Error::InvalidParameter {
                name: "mat",
                message: "matrix must be stored in CSR format".into(),
            });
        }
        if rows.start > rows.end || rows.end > mat.rows() {
            return Err(Error::InvalidParameter {
                name: "rows",
                message: format!(
                    "row block {:?} is not inside a matrix with {} rows",
                    rows,
                    mat.rows()
                ),
            });
        }

        let num_local = rows.len();
        let mut ghosts: IndexSet<usize> = IndexSet::new();
        let mut row_offsets = Vec::with_capacity(num_local + 1);
        let mut col_indices = Vec::with_capacity(mat.nnz());
        let mut boundary = Vec::with_capacity(num_local);
        row_offsets.push(0);

        for global_row in rows.clone() {
            let mut has_off_diagonal = false;
            if let Some(row_vec) = mat.outer_view(global_row) {
                for (global_col, val) in row_vec.iter() {
                    if global_col != global_row {
                        if val.abs() <= drop_tolerance {
                            continue;
                        }
                        has_off_diagonal = true;
                    }
                    let col = if rows.contains(&global_col) {
                        global_col - rows.start
                    } else {
                        num_local + ghosts.insert_full(global_col).0
                    };
                    col_indices.push(col);
                }
            }
            row_offsets.push(col_indices.len());
            boundary.push(!has_off_diagonal);
        }

        let col_map = rows.chain(ghosts.into_iter()).collect();

        Ok(Self {
            rank,
            num_local,
            row_offsets,
            col_indices,
            col_map,
            boundary,
        })
    }

    /// Number of ghost columns referenced by the local rows.
    pub fn num_ghosts(&self) -> usize {
        self.col_map.len().saturating_sub(self.num_local)
    }

    /// Global index of a local or ghost column.
    pub fn global_index(&self, col: usize) -> Option<usize> {
        self.col_map.get(col).copied()
    }

    pub fn col_map(&self) -> &[usize] {
        &self.col_map
    }

    pub fn boundary_nodes(&self) -> &[bool] {
        &self.boundary
    }
}

impl Graph for LocalGraph {
    fn num_vertices(&self) -> usize {
        self.num_local
    }

    fn neighbors(&self, v: usize) -> &[usize] {
        &self.col_indices[self.row_offsets[v]..self.row_offsets[v + 1]]
    }

    fn is_local_neighbor(&self, j: usize) -> bool {
        j < self.num_local
    }

    fn owner_rank(&self) -> usize {
        self.rank
    }

    fn is_boundary(&self, v: usize) -> bool {
        self.boundary[v]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    // 1d laplacian with a Dirichlet row at each end
    fn laplace_1d(n: usize) -> CsrMatrix {
        let mut mat = TriMat::new((n, n));
        for i in 0..n {
            mat.add_triplet(i, i, 2.0);
            if i == 0 || i == n - 1 {
                continue;
            }
            mat.add_triplet(i, i - 1, -1.0);
            mat.add_triplet(i, i + 1, -1.0);
        }
        mat.to_csr::<usize>()
    }

    #[test]
    fn matrix_graph_keeps_storage_order() {
        let graph = LocalGraph::from_matrix(&laplace_1d(5), 0.0).unwrap();
        assert_eq!(graph.num_vertices(), 5);
        assert_eq!(graph.neighbors(2), &[1, 2, 3]);
        assert_eq!(graph.num_ghosts(), 0);
        assert_eq!(
            graph.boundary_nodes(),
            &[true, false, false, false, true]
        );
    }

    #[test]
    fn row_block_numbers_ghosts_after_locals() {
        let mat = laplace_1d(8);
        let graph = LocalGraph::from_row_block(&mat, 3..6, 1, 0.0).unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.owner_rank(), 1);
        // global row 3 -> neighbors 2 (ghost), 3, 4
        assert_eq!(graph.neighbors(0), &[3, 0, 1]);
        // global row 5 -> neighbors 4, 5, 6 (ghost)
        assert_eq!(graph.neighbors(2), &[1, 2, 4]);
        assert_eq!(graph.col_map(), &[3, 4, 5, 2, 6]);
        assert!(!graph.is_local_neighbor(3));
        assert!(graph.is_local_neighbor(2));
        assert_eq!(graph.global_index(4), Some(6));
    }

    #[test]
    fn drop_tolerance_removes_weak_edges() {
        let mut mat = TriMat::new((3, 3));
        mat.add_triplet(0, 0, 1.0);
        mat.add_triplet(0, 1, -1e-8);
        mat.add_triplet(1, 0, -1e-8);
        mat.add_triplet(1, 1, 1.0);
        mat.add_triplet(1, 2, -1.0);
        mat.add_triplet(2, 1, -1.0);
        mat.add_triplet(2, 2, 1.0);
        let graph = LocalGraph::from_matrix(&mat.to_csr::<usize>(), 1e-6).unwrap();
        assert_eq!(graph.neighbors(0), &[0]);
        assert!(graph.is_boundary(0));
        assert_eq!(graph.neighbors(1), &[1, 2]);
        assert!(!graph.is_boundary(1));
    }

    #[test]
    fn rejects_non_square() {
        let mut mat = TriMat::new((2, 3));
        mat.add_triplet(0, 0, 1.0);
        let err = LocalGraph::from_matrix(&mat.to_csr::<usize>(), 0.0).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn adjacency_graph_ghosts() {
        let graph = LocalGraph::from_adjacency(&[vec![0, 5], vec![1]]);
        assert!(!graph.is_boundary(0));
        assert!(graph.is_boundary(1));
        assert!(!graph.is_local_neighbor(5));
        assert_eq!(graph.num_ghosts(), 4);
    }
}
