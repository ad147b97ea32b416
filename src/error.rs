use std::path::PathBuf;

use thiserror::Error;

macro_rules! structural_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Structural {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Structural {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error aborts the whole rewrite request. A partially rewritten set of assemblies would
/// reference identities that no longer exist, so nothing is retried or skipped.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::Resolution`] - A dependency is neither part of the request nor on a search path
/// - [`Error::Load`] - A module could not be read by the module format
///
/// ## Structural Errors
/// - [`Error::Structural`] - The metadata graph violates an internal invariant
///
/// ## Request Errors
/// - [`Error::DuplicateIdentity`] - Two modules would map to or from the same identity
/// - [`Error::PathCountMismatch`] - Input and output lists differ in length
/// - [`Error::InvalidPath`] - A path does not carry a usable file name
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Write`] - The destination module could not be written
/// - [`Error::Format`] - The module image could not be (de)serialized
///
/// # Examples
///
/// ```rust,no_run
/// use dotrename::{Error, project::RewriteRequest, file::JsonFormat};
///
/// let request = RewriteRequest::new().with_module("Orig.json", "New.json");
/// match request.run(&JsonFormat::default()) {
///     Ok(report) => println!("Rewrote {} modules", report.modules.len()),
///     Err(Error::Resolution { name, referrer }) => {
///         eprintln!("{referrer} depends on {name}, which could not be found");
///     }
///     Err(e) => eprintln!("Rewrite failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata graph is internally inconsistent.
    ///
    /// Raised when a reference that must exist is absent, for example an arena index that
    /// points past the end of its table, or a custom attribute constructor without a
    /// declaring type. The error includes the source location where the violation was
    /// detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the violated invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Structural - {file}:{line}: {message}")]
    Structural {
        /// The message to be printed for the Structural error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A dependency could not be located.
    ///
    /// The dependency is not part of the rewrite request, is not provided by the runtime,
    /// and no matching file exists in any search path.
    #[error("Failed to resolve dependency '{name}' referenced by '{referrer}'")]
    Resolution {
        /// Simple name of the missing assembly
        name: String,
        /// Identity of the module declaring the reference
        referrer: String,
    },

    /// A module could not be loaded.
    #[error("Failed to load module {} - {source}", path.display())]
    Load {
        /// Path of the module that failed to load
        path: PathBuf,
        /// The underlying failure
        source: Box<Error>,
    },

    /// The destination module could not be written.
    #[error("Failed to write module {} - {source}", path.display())]
    Write {
        /// Destination that could not be written
        path: PathBuf,
        /// The underlying I/O failure
        source: std::io::Error,
    },

    /// An identity appears more than once in the rewrite request.
    #[error("Identity '{0}' appears more than once in the rewrite request")]
    DuplicateIdentity(String),

    /// The input and output path lists are not pairwise.
    #[error("Got {inputs} input modules but {outputs} output paths")]
    PathCountMismatch {
        /// Number of input paths
        inputs: usize,
        /// Number of output paths
        outputs: usize,
    },

    /// The output of one module is the input of another module of the request.
    #[error("Output {} would overwrite the input of another module", output.display())]
    PathConflict {
        /// Output path of the offending module
        output: PathBuf,
        /// Input of the module it would overwrite
        input: PathBuf,
    },

    /// A path that should name a module file has no usable file stem.
    #[error("Path does not name a module file: {}", .0.display())]
    InvalidPath(PathBuf),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The module image could not be serialized or deserialized.
    #[error("{0}")]
    Format(#[from] serde_json::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
