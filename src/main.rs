use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use allure_steps::cli::{Cli, Commands, ConfigCommands};
use allure_steps::commands::run::RunOptions;
use allure_steps::commands::{attach, prepare, run, summarize, BatchReport, FileOutcome, Outcome};
use allure_steps::{Config, ReportError};

/// JSON response structure for --json output mode
#[derive(Serialize, Deserialize)]
struct JsonResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl JsonResponse {
    fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }

    fn print(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize JSON response: {}", e),
        }
    }
}

/// How results are reported on the terminal
#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = dispatch(cli).await {
        let code = err
            .downcast_ref::<ReportError>()
            .map(ReportError::exit_code)
            .unwrap_or(1);

        if json_mode {
            JsonResponse::error(format!("{:#}", err)).print();
        } else {
            eprintln!("{} {:#}", "❌".bright_red(), err);
        }
        std::process::exit(code);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let output = Output {
        json: cli.json,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Completion { shell } => {
            handle_completion_command(&shell);
            Ok(())
        }
        Commands::Config(config_cmd) => {
            handle_config_command(config_cmd, cli.config.as_deref(), output).await
        }
        command => {
            let config = Config::load(cli.config.as_deref())
                .await
                .context("Failed to load configuration")?;
            handle_report_command(command, &config, output).await
        }
    }
}

async fn handle_report_command(command: Commands, config: &Config, output: Output) -> Result<()> {
    match command {
        Commands::Prepare {
            results_dir,
            dry_run,
        } => handle_prepare_command(&results_dir, config, dry_run, output).await,
        Commands::Attach {
            results_dir,
            dry_run,
        } => handle_attach_command(&results_dir, config, dry_run, output).await,
        Commands::Summarize {
            results_dir,
            output: summary_name,
        } => handle_summarize_command(&results_dir, config, summary_name.as_deref(), output).await,
        Commands::Run {
            results_dir,
            output: summary_name,
            no_diagram,
        } => {
            let options = RunOptions {
                output: summary_name,
                diagram: !no_diagram,
            };
            handle_run_command(&results_dir, config, &options, output).await
        }
        Commands::Completion { .. } | Commands::Config(_) => Ok(()),
    }
}

async fn handle_prepare_command(
    results_dir: &Path,
    config: &Config,
    dry_run: bool,
    output: Output,
) -> Result<()> {
    if !output.json && !output.quiet {
        println!(
            "{} Grouping business steps in: {}",
            "🧩".bright_cyan(),
            results_dir.display().to_string().bright_white()
        );
    }

    let report = prepare::prepare_dir(results_dir, config, dry_run).await?;
    finish_batch(&report, output)
}

async fn handle_attach_command(
    results_dir: &Path,
    config: &Config,
    dry_run: bool,
    output: Output,
) -> Result<()> {
    if !output.json && !output.quiet {
        println!(
            "{} Attaching business step flows in: {}",
            "📎".bright_cyan(),
            results_dir.display().to_string().bright_white()
        );
    }

    let report = attach::attach_dir(results_dir, config, dry_run).await?;
    finish_batch(&report, output)
}

async fn handle_summarize_command(
    results_dir: &Path,
    config: &Config,
    summary_name: Option<&str>,
    output: Output,
) -> Result<()> {
    let report = summarize::summarize_dir(results_dir, config, summary_name).await?;

    if output.json {
        JsonResponse::success(serde_json::to_value(&report)?).print();
        return Ok(());
    }

    print_outcomes(&report.batch, output);
    println!(
        "{} Wrote summary with {} test case(s) to {}",
        "📄".bright_green(),
        report.test_cases.to_string().bright_white(),
        report.output.display()
    );
    Ok(())
}

async fn handle_run_command(
    results_dir: &Path,
    config: &Config,
    options: &RunOptions,
    output: Output,
) -> Result<()> {
    let report = run::run_pipeline(results_dir, config, options).await?;

    if output.json {
        JsonResponse::success(serde_json::to_value(&report)?).print();
        return Ok(());
    }

    print_outcomes(&report.prepared, output);
    print_totals(&report.prepared);
    print_outcomes(&report.summary.batch, output);
    println!(
        "{} Wrote summary with {} test case(s) to {}",
        "📄".bright_green(),
        report.summary.test_cases.to_string().bright_white(),
        report.summary.output.display()
    );
    Ok(())
}

async fn handle_config_command(
    command: ConfigCommands,
    explicit: Option<&Path>,
    output: Output,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load(explicit)
                .await
                .context("Failed to load configuration")?;
            if output.json {
                JsonResponse::success(serde_json::to_value(&config)?).print();
            } else {
                print!("{}", config.to_toml()?);
            }
        }
        ConfigCommands::Init { force } => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => Config::get_config_path()?,
            };
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }

            Config::default()
                .save(&path)
                .await
                .context("Failed to write configuration")?;

            if output.json {
                JsonResponse::success(serde_json::json!({
                    "message": "Configuration written",
                    "path": path.display().to_string()
                }))
                .print();
            } else {
                println!(
                    "{} Configuration written to {}",
                    "✅".bright_green(),
                    path.display().to_string().bright_white()
                );
            }
        }
    }
    Ok(())
}

fn handle_completion_command(shell: &clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::{generate, Generator};
    use std::io;

    fn print_completions<G: Generator>(gen: G, cmd: &mut clap::Command) {
        generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    }

    let mut cmd = Cli::command();
    print_completions(*shell, &mut cmd);
}

fn finish_batch(report: &BatchReport, output: Output) -> Result<()> {
    if output.json {
        JsonResponse::success(serde_json::to_value(report)?).print();
        return Ok(());
    }

    print_outcomes(report, output);
    print_totals(report);
    Ok(())
}

fn print_outcomes(report: &BatchReport, output: Output) {
    if output.quiet {
        return;
    }
    for entry in &report.files {
        print_outcome(entry);
    }
}

fn print_outcome(entry: &FileOutcome) {
    let file = entry.file.as_str();
    match &entry.outcome {
        Outcome::Grouped {
            groups,
            diagram,
            written,
        } => {
            let verb = if *written { "Processed" } else { "Would process" };
            match diagram {
                Some(diagram) => println!(
                    "{} {} {} ({} group(s)) -> {}",
                    "✅".bright_green(),
                    verb,
                    file.bright_white(),
                    groups,
                    diagram
                ),
                None => println!(
                    "{} {} {} ({} group(s))",
                    "✅".bright_green(),
                    verb,
                    file.bright_white(),
                    groups
                ),
            }
        }
        Outcome::Attached { diagram, written } => {
            let verb = if *written { "Attached HTML to" } else { "Would attach HTML to" };
            println!(
                "{} {} {} -> {}",
                "📎".bright_green(),
                verb,
                file.bright_white(),
                diagram
            );
        }
        Outcome::Summarized => {}
        Outcome::Unchanged => {
            println!("{} {} is up to date", "➖".dimmed(), file.dimmed());
        }
        Outcome::NoSteps => {
            println!("{} {} has no steps", "➖".dimmed(), file.dimmed());
        }
        Outcome::NoGroups => {
            println!("{} {} has no business steps", "➖".dimmed(), file.dimmed());
        }
        Outcome::Skipped { reason } => {
            eprintln!("{} Skipping {}: {}", "⚠️ ".bright_yellow(), file, reason);
        }
        Outcome::Failed { reason } => {
            eprintln!("{} Failed on {}: {}", "❌".bright_red(), file, reason);
        }
    }
}

fn print_totals(report: &BatchReport) {
    let problems = report.problems();
    let summary = format!(
        "{} of {} result file(s) updated",
        report.changed(),
        report.files.len()
    );

    if problems == 0 {
        println!("{} {}", "🎯".bright_green(), summary);
    } else {
        println!(
            "{} {}, {} {}",
            "🎯".bright_yellow(),
            summary,
            problems,
            "problem(s)".bright_yellow()
        );
    }
}
