use core::fmt;

/// Result alias for `amg_agg`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while building aggregates.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A non-Dirichlet vertex has no on-rank neighbor and the caller asked for
    /// isolated vertices to be fatal.
    IsolatedNode {
        /// Local index of the isolated vertex.
        vertex: usize,
        /// Rank owning the vertex.
        rank: usize,
    },

    /// The phase pipeline finished with vertices still ready.
    UnaggregatedNodes {
        /// Rank that failed.
        rank: usize,
        /// Number of vertices left behind.
        count: usize,
    },

    /// Dimension mismatch between two inputs.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Reading or writing a file failed.
    Io(String),

    /// A JSON document could not be parsed or did not match the expected
    /// fields.
    Parse(String),

    /// The caller's count of non-aggregated vertices is below the number of
    /// vertices still ready.
    CounterUnderflow {
        /// Count handed to the phase.
        count: usize,
        /// Vertices with status ready.
        ready: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IsolatedNode { vertex, rank } => {
                writeln!(
                    f,
                    "Phase3::build_aggregates: vertex {} on rank {} is a non-Dirichlet node with no on-rank neighbors, terminating by user request.",
                    vertex, rank
                )?;
                writeln!(
                    f,
                    "If this error is generated at level 0, the initial partitioning of the matrix is the problem."
                )?;
                write!(
                    f,
                    "If it is generated at any other level, try turning on repartitioning, which may fix it."
                )
            }
            Error::UnaggregatedNodes { rank, count } => {
                write!(f, "{} vertices on rank {} were left unaggregated", count, rank)
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter `{}`: {}", name, message)
            }
            Error::Io(message) => write!(f, "io error: {}", message),
            Error::Parse(message) => write!(f, "parse error: {}", message),
            Error::CounterUnderflow { count, ready } => write!(
                f,
                "non-aggregated vertex count {} is smaller than the {} ready vertices",
                count, ready
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else {
            Error::Parse(err.to_string())
        }
    }
}
