//! course-archiver - offline archive of a Skool classroom

mod cli;

use std::process::ExitCode;

use anyhow::Context;
use archiver_engine::{create_dir, Archiver, HttpPageSource, YtDlpDownloader};
use archiver_logging::{archive_error, archive_info};
use clap::Parser;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            archive_error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.engine_config();
    create_dir(&config.output_dir)
        .with_context(|| format!("cannot use output directory {}", config.output_dir.display()))?;
    archiver_logging::initialize(cli.log_destination(), cli.log_level());
    archive_info!("Archiving {} into {}", config.classroom_url, config.output_dir.display());

    let pages = HttpPageSource::new(&config.page).context("cannot build HTTP client")?;
    let downloader = YtDlpDownloader::new(config.downloader_program.clone());
    let archiver = Archiver::new(config, Box::new(pages), Box::new(downloader));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    let manifest = runtime.block_on(archiver.run_bounded())?;

    let modules: usize = manifest.courses.iter().map(|c| c.modules.len()).sum();
    let videos: usize = manifest
        .courses
        .iter()
        .flat_map(|c| &c.modules)
        .map(|m| m.videos.len())
        .sum();
    archive_info!(
        "Archived {} courses, {} modules, {} videos",
        manifest.courses.len(),
        modules,
        videos
    );
    Ok(())
}
