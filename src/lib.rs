//! Uncoupled aggregation for algebraic multigrid coarsening.
//!
//! <br>
//!
//! Aggregation based AMG builds its coarse spaces by clustering the vertices of
//! the matrix graph into small connected groups, the aggregates. Each aggregate
//! becomes a single coarse unknown and the tentative prolongator is just the
//! 0/1 matrix mapping fine vertices to their aggregate.
//!
//! The aggregation is "uncoupled": every rank only looks at the rows it owns
//! and never aggregates across a rank boundary. It runs as a pipeline of phases
//! over a shared per-vertex status array:
//!
//! - [`phases::PreserveDirichlet`] removes boundary rows from consideration,
//! - [`phases::Phase1`] builds bounded aggregates around greedily chosen roots,
//! - [`phases::Phase3`] mops up whatever is left, either by forming a new
//!   aggregate with unaggregated neighbors, joining a neighboring aggregate, or
//!   creating a singleton (or failing, if the caller forbids isolated nodes).
//!
//! [`uncoupled::UncoupledAggregation`] drives the pipeline on one rank and
//! [`distributed`] splits a global matrix into row blocks and aggregates all
//! of the blocks in parallel.

use sprs::CsMatBase;

#[macro_use]
extern crate log;

pub mod aggregates;
pub mod distributed;
pub mod error;
pub mod graph;
pub mod io;
pub mod params;
pub mod phases;
pub mod uncoupled;

pub use error::{Error, Result};

pub type CsrMatrix = CsMatBase<f64, usize, Vec<usize>, Vec<usize>, Vec<f64>, usize>;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use lazy_static::lazy_static;

// Lazily-initialised output directory.
lazy_static! {
    static ref OUTPUT_DIR: PathBuf = {
        let base = Path::new("./output");
        let ts = Local::now().format("%Y-%m-%d_%H:%M:%S").to_string();
        let mut candidate = base.join(&ts);
        let mut suffix = 1u32;
        while candidate.exists() {
            candidate = base.join(format!("{}_{}", ts, suffix));
            suffix += 1;
        }
        candidate
    };
    pub static ref N_CPUS: usize = num_cpus::get();
}

/// Helper to build paths inside the output directory. The directory itself is
/// created on first use.
///
/// ```no_run
/// use std::io::Write;
///
/// let path = amg_agg::output_path("example.txt").unwrap();
/// let mut f = std::fs::File::create(&path).unwrap();
/// writeln!(f, "Hello, world!").unwrap();
/// ```
pub fn output_path<S: AsRef<Path>>(file: S) -> Result<PathBuf> {
    fs::create_dir_all(&*OUTPUT_DIR)?;
    Ok(OUTPUT_DIR.join(file))
}
