//! Line-mode shell: one command per stdin line, slash commands for the
//! background supervisor.

use std::io::Write;

use anyhow::Result;
use shellgate_core::ShellEngine;
use shellgate_core::session::workspace_display;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{print_exec_output, render, report};

#[derive(Debug, PartialEq, Eq)]
enum ShellLine<'a> {
    Blank,
    Quit,
    Help,
    Pwd,
    List,
    Background(&'a str),
    Stop(usize),
    Logs(usize),
    Usage(&'static str),
    Foreground(&'a str),
}

const HELP: &str = "\
/bg CMD     start CMD in the background
/ps         list background processes
/stop ID    stop a background process
/logs ID    show the end of a background log
/pwd        show the current directory
/quit       leave the shell
anything else runs in the foreground";

fn parse_line(line: &str) -> ShellLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ShellLine::Blank;
    }
    let Some(slash) = line.strip_prefix('/') else {
        return ShellLine::Foreground(line);
    };

    let (name, rest) = slash
        .split_once(char::is_whitespace)
        .map_or((slash, ""), |(name, rest)| (name, rest.trim()));
    match name {
        "quit" | "exit" => ShellLine::Quit,
        "help" => ShellLine::Help,
        "pwd" => ShellLine::Pwd,
        "ps" => ShellLine::List,
        "bg" if !rest.is_empty() => ShellLine::Background(rest),
        "bg" => ShellLine::Usage("usage: /bg CMD"),
        "stop" => rest.parse().map_or(ShellLine::Usage("usage: /stop ID"), ShellLine::Stop),
        "logs" => rest.parse().map_or(ShellLine::Usage("usage: /logs ID"), ShellLine::Logs),
        // Not a slash command: an absolute-looking path such as `/bin/ls`
        // still goes through the gate.
        _ => ShellLine::Foreground(line),
    }
}

fn prompt(engine: &ShellEngine, user: &str) {
    let location = match (engine.ensure_workspace(user), engine.current_dir(user)) {
        (Ok(root), Ok(cwd)) => workspace_display(&root, &cwd),
        _ => "?".to_string(),
    };
    print!("{user}:{location}$ ");
    std::io::stdout().flush().ok();
}

pub async fn run_shell(engine: &ShellEngine, user: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(engine, user);
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                debug!(user, "interrupted; leaving shell");
                break;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_line(&line) {
            ShellLine::Blank => {}
            ShellLine::Quit => break,
            ShellLine::Help => println!("{HELP}"),
            ShellLine::Usage(usage) => eprintln!("{usage}"),
            ShellLine::Pwd => match engine.current_dir(user) {
                Ok(dir) => println!("{}", dir.display()),
                Err(err) => report(&err),
            },
            ShellLine::List => match engine.list_background(user) {
                Ok(entries) => println!("{}", render::process_table(&entries)),
                Err(err) => report(&err),
            },
            ShellLine::Background(command) => match engine.spawn_background(user, command).await {
                Ok(record) => println!("{}", render::record_line(&record)),
                Err(err) => report(&err),
            },
            ShellLine::Stop(id) => match engine.stop_background(user, id).await {
                Ok(outcome) => println!("{}", render::stop_line(id, outcome)),
                Err(err) => report(&err),
            },
            ShellLine::Logs(id) => match engine.tail_log(user, id).await {
                Ok(tail) => println!("{}", render::log_text(id, tail)),
                Err(err) => report(&err),
            },
            ShellLine::Foreground(command) => match engine.execute(user, command).await {
                Ok(output) => {
                    let _ = print_exec_output(&output);
                }
                Err(err) => report(&err),
            },
        }
    }

    Ok(())
}
