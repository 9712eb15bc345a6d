use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pdf_similarity::cli::Args;
use pdf_similarity::client::{resolve_report_url, HttpCompareClient};
use pdf_similarity::config::Config;
use pdf_similarity::error::CompareError;
use pdf_similarity::report;
use pdf_similarity::terminal;
use pdf_similarity::upload::{PdfFile, SubmitOutcome, UiEvent, UploadController};
use pdf_similarity::view::Effect;
use pdf_similarity::Slot;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "pdf-similarity", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_tracing();
    let color = !args.no_color;

    match run(&args, color).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            terminal::print_alert(&e.to_string(), color);
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` means the comparison itself raised an alert.
async fn run(args: &Args, color: bool) -> Result<bool, CompareError> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;
    debug!(?config, "configuration resolved");

    let client = HttpCompareClient::from_config(&config)?;
    let mut controller = UploadController::with_weight(config.weight_text);

    for (slot, path) in Slot::ALL.into_iter().zip([&args.file1, &args.file2]) {
        if let Some(path) = path {
            controller.dispatch(UiEvent::Pick(slot, PdfFile::from_path(path)?));
        }
    }

    let outcome = controller.submit(&client).await;
    if let Some(message) = outcome.alert() {
        terminal::print_alert(message, color);
        return Ok(false);
    }

    if let Some(result) = &outcome.result {
        if args.json {
            let json = serde_json::to_string_pretty(result)?;
            println!("{json}");
        } else {
            terminal::print_summary(result, color);
        }
    }

    if !args.no_report {
        write_report(args, &config, &controller, &outcome)?;
    }
    Ok(true)
}

fn write_report(
    args: &Args,
    config: &Config,
    controller: &UploadController,
    outcome: &SubmitOutcome,
) -> Result<(), CompareError> {
    let mut results = controller.page().results.clone();
    if let Some(href) = results.report_link.href.take() {
        results.report_link.href = Some(resolve_report_url(&config.server_url, &href));
    }
    let typeset = outcome.effects.contains(&Effect::Typeset);
    let html = report::render_report(&results, typeset, config.mathjax);

    let path = match &args.output {
        Some(path) => path.clone(),
        None => report::default_report_path(&config.report_dir),
    };
    report::write_report(&path, &html)?;
    if !args.json {
        println!("Report written to {}", path.display());
    }
    Ok(())
}
