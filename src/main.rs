mod cli_args;
mod config;
mod error;
mod llm;
mod logging;
mod review;
mod setup;
mod templates;
mod writer;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::ProgressBar;

use crate::cli_args::Cli;
use crate::config::Config;
use crate::review::ReviewRequest;
use crate::templates::TemplateStore;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logger(cli.verbose) {
        eprintln!("{} logging disabled: {err}", "Warning:".yellow().bold());
    }

    if let Err(err) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let templates = TemplateStore::load(cli.templates.as_deref())?;

    if cli.list_modes {
        for mode in templates.modes() {
            println!("{mode}");
        }
        return Ok(());
    }

    let input = cli
        .input()
        .context("either --file or --code is required")?;
    let config = Config::load(cli.config.as_deref())?;
    let client = setup::build_llm_client(&cli.provider, cli.model.as_deref(), &config)?;
    let request = ReviewRequest::new(&input, &cli.mode, client.as_ref())?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!(
        "Waiting for {} ({})...",
        request.provider, request.model
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = request.run(&templates, client.as_ref());
    spinner.finish_and_clear();
    let result = outcome?;

    let path = writer::write(&result, &cli.output).with_context(|| {
        format!("review finished but could not be saved under {}", cli.output.display())
    })?;

    println!("{}", "Review completed successfully!".green().bold());
    println!("Review saved to: {}", path.display());

    if !cli.quiet {
        println!("\n=== Review Summary ===\n");
        println!("{}", result.review_text);
    }

    Ok(())
}
