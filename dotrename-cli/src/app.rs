use std::path::PathBuf;

use clap::Parser;

/// dotrename - rename the identity of .NET metadata images and rewrite every reference to it
///
/// Modules are read and written as JSON metadata images; converting PE files to and from
/// that form is left to an external tool. Each `--input` is paired with the `--output` at the
/// same position. The file stem of the input is the identity being replaced, the file stem of
/// the output its replacement.
#[derive(Debug, Parser)]
#[command(
    name = "dotrename",
    version,
    about = "Rename the identity of .NET metadata images (JSON) and rewrite every reference to it",
    long_about = None
)]
pub struct Cli {
    /// Module to rewrite. Repeat for every module of the set.
    #[arg(short, long = "input", value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Destination of the module given by the matching --input.
    #[arg(short, long = "output", value_name = "FILE", required = true)]
    pub outputs: Vec<PathBuf>,

    /// Directory searched for dependencies outside the set.
    #[arg(short, long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    /// Strong name key to sign every output with. Signing is skipped if the file is missing.
    #[arg(short, long, value_name = "FILE")]
    pub key: Option<PathBuf>,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options controlling output.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit the report as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output, one line per rewritten name.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_repeated_pairs() {
        let cli = Cli::parse_from([
            "dotrename", "-i", "A.json", "-o", "X.A.json", "--input", "B.json", "--output",
            "X.B.json", "--key", "key.snk", "-v",
        ]);

        assert_eq!(cli.inputs, vec![PathBuf::from("A.json"), PathBuf::from("B.json")]);
        assert_eq!(cli.outputs, vec![PathBuf::from("X.A.json"), PathBuf::from("X.B.json")]);
        assert_eq!(cli.key, Some(PathBuf::from("key.snk")));
        assert!(cli.global.verbose);
        assert!(!cli.global.json);
    }

    #[test]
    fn test_about_names_metadata_images() {
        let about = Cli::command().get_about().map(ToString::to_string).unwrap_or_default();
        assert!(about.contains("metadata images"));
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["dotrename", "-o", "X.json"]).is_err());
    }
}
