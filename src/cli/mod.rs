//! CLI handlers. Each subcommand authorizes the caller, drives the engine,
//! and renders the result; engine errors become `error:` lines and a
//! failing exit status.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use shellgate_config::ShellgateConfig;
use shellgate_core::{ExecOutput, ShellEngine, ShellError, TransferDirection};
use tracing::warn;

mod access;
pub mod args;
mod render;
mod shell;

use access::AccessPolicy;
use args::{Cli, Commands};

pub(crate) fn report(err: &ShellError) {
    eprintln!("error: {err}");
}

/// Print stdout then stderr; returns the exit status to propagate.
pub(crate) fn print_exec_output(output: &ExecOutput) -> u8 {
    let mut stdout = std::io::stdout();
    stdout.write_all(output.stdout.as_bytes()).ok();
    stdout.flush().ok();
    if !output.stderr.is_empty() {
        eprint!("{}", output.stderr);
    }
    output
        .exit_code
        .map_or(0, |code| u8::try_from(code).unwrap_or(1))
}

pub async fn run(args: Cli, config: ShellgateConfig) -> Result<ExitCode> {
    let user = args.command.user().to_string();
    if let Err(err) = AccessPolicy::new(config.access.clone()).authorize(&user) {
        report(&err);
        return Ok(ExitCode::FAILURE);
    }

    let engine = ShellEngine::new(&config);
    let result = dispatch(&engine, &user, args.command).await;

    if let Err(err) = engine.shutdown() {
        warn!(error = %format!("{err:#}"), "failed to flush engine state");
    }

    match result? {
        Ok(code) => Ok(code),
        Err(err) => {
            report(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Outer error: the CLI itself failed. Inner error: the engine refused.
async fn dispatch(
    engine: &ShellEngine,
    user: &str,
    command: Commands,
) -> Result<Result<ExitCode, ShellError>> {
    let outcome = match command {
        Commands::Exec(args) => engine
            .execute(user, &args.command_line())
            .await
            .map(|output| ExitCode::from(print_exec_output(&output))),
        Commands::Spawn(args) => engine
            .spawn_background(user, &args.command_line())
            .await
            .map(|record| {
                println!("{}", render::record_line(&record));
                ExitCode::SUCCESS
            }),
        Commands::Ps(args) => match engine.list_background(user) {
            Ok(entries) if args.json => {
                let json = serde_json::to_string_pretty(&entries)
                    .context("failed to serialize process list")?;
                println!("{json}");
                Ok(ExitCode::SUCCESS)
            }
            Ok(entries) => {
                println!("{}", render::process_table(&entries));
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => Err(err),
        },
        Commands::Stop(args) => engine.stop_background(user, args.id).await.map(|outcome| {
            println!("{}", render::stop_line(args.id, outcome));
            ExitCode::SUCCESS
        }),
        Commands::Logs(args) => engine.tail_log(user, args.id).await.map(|tail| {
            println!("{}", render::log_text(args.id, tail));
            ExitCode::SUCCESS
        }),
        Commands::Path(args) => {
            let direction = if args.upload {
                TransferDirection::Upload
            } else {
                TransferDirection::Download
            };
            engine
                .resolve_transfer_path(user, &args.name, direction)
                .map(|path| {
                    println!("{}", path.display());
                    ExitCode::SUCCESS
                })
        }
        Commands::Shell(_) => {
            shell::run_shell(engine, user).await?;
            Ok(ExitCode::SUCCESS)
        }
    };
    Ok(outcome)
}
