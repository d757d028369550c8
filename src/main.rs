use std::path::PathBuf;

use amg_agg::{
    distributed::{aggregate_ranks, split_rows},
    io::{write_json, AggregationReport},
    output_path,
    params::{AggregationParams, Ordering},
    Error, Result, N_CPUS,
};
use structopt::StructOpt;

#[macro_use]
extern crate log;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "amg_agg",
    about = "Aggregate the graph of a sparse matrix for AMG coarsening"
)]
struct Opt {
    /// Matrix file in matrix market format
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Number of simulated ranks, each owning a contiguous block of rows
    #[structopt(short, long, default_value = "1")]
    ranks: usize,

    /// JSON parameter list
    #[structopt(short, long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Fail instead of creating singletons for vertices without on-rank neighbors
    #[structopt(long)]
    error_on_isolated: bool,

    /// Phase 1 ordering. Options are:
    /// natural, random
    #[structopt(long)]
    ordering: Option<Ordering>,

    /// Threads used to aggregate the ranks, defaults to the number of cpus
    #[structopt(long)]
    threads: Option<usize>,

    /// Where to write the JSON report, defaults to the output directory
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn run(opt: Opt) -> Result<()> {
    let mut params = match &opt.params {
        Some(path) => AggregationParams::from_file(path)?,
        None => AggregationParams::default(),
    };
    if opt.error_on_isolated {
        params.error_on_isolated = true;
    }
    if let Some(ordering) = opt.ordering {
        params.ordering = ordering;
    }
    params.validate()?;

    let threads = opt.threads.unwrap_or(*N_CPUS);
    if let Err(err) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        warn!("could not size the thread pool: {}", err);
    }

    info!("Loading {}...", opt.input.display());
    let mat = sprs::io::read_matrix_market::<f64, usize, _>(&opt.input)
        .map_err(|err| Error::Io(format!("{}: {}", opt.input.display(), err)))?
        .to_csr::<usize>();
    info!(
        "{} rows, {} nonzeros, {} ranks, {} threads",
        mat.rows(),
        mat.nnz(),
        opt.ranks,
        threads
    );

    let graphs = split_rows(&mat, opt.ranks, params.drop_tolerance)?;
    let global = aggregate_ranks(&graphs, &params)?;

    let name = opt
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report = AggregationReport::new(&name, &global);
    info!(
        "{} aggregates, coarsening factor {:.2}",
        report.num_aggregates, report.coarsening_factor
    );

    let out = match opt.output {
        Some(path) => path,
        None => output_path(format!("{}_aggregates.json", name))?,
    };
    write_json(&out, &report)?;
    info!("Wrote {}", out.display());
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let opt = Opt::from_args();

    if let Err(err) = run(opt) {
        error!("{}", err);
        std::process::exit(1);
    }
}
