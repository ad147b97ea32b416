mod app;
mod output;

use anyhow::Context;
use clap::Parser;
use dotrename::prelude::*;

use crate::{
    app::Cli,
    output::{print_output, Align, ReportSummary, TabWriter},
};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show dotrename info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("dotrename", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let verbosity = if cli.global.verbose {
        Verbosity::Detailed
    } else {
        Verbosity::Normal
    };

    let mut request = RewriteRequest::from_pairs(cli.inputs.clone(), cli.outputs.clone())?
        .with_verbosity(verbosity);
    for path in &cli.search_paths {
        request = request.with_search_path(path);
    }
    if let Some(key) = &cli.key {
        request = request.with_key_file(key);
    }

    let report = request
        .run(&JsonFormat::default())
        .context("rewrite failed")?;

    let summary = ReportSummary::from(&report);
    print_output(&summary, &cli.global, |summary| {
        let mut table = TabWriter::new(vec![
            ("ORIGINAL", Align::Left),
            ("RENAMED", Align::Left),
            ("NAMES", Align::Right),
            ("REFS", Align::Right),
            ("OUTPUT", Align::Left),
        ]);
        for module in &summary.modules {
            table.row(vec![
                module.original.clone(),
                module.renamed.clone(),
                module.names.to_string(),
                module.references.to_string(),
                module.output.clone(),
            ]);
        }
        table.print();
        println!();
        println!(
            "{} modules, {} names rewritten{}",
            summary.modules.len(),
            summary.total_names,
            if summary.signed { ", signed" } else { "" }
        );
    })
}
