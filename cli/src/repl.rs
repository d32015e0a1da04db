//! Interactive session over stdin.
//!
//! Commands edit the filter, run searches, and start classifications. A
//! background watcher prints classifications as they resolve so the prompt
//! never waits on one.

#[cfg(test)]
#[path = "repl_test.rs"]
mod repl_test;

use std::io::Write;

use message_dashboard::Dashboard;
use message_dashboard::net::types::MessageId;
use message_dashboard::state::store::DashboardState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::CliError;
use crate::render::{render, resolved_since};

pub const HELP: &str = "\
commands:
  filter <text>       set the physician filter (not applied until search)
  from <date>         set the lower date bound
  to <date>           set the upper date bound
  search [text]       apply the filter, optionally replacing its text first
  clear               reset all filter inputs and list everything
  classify <id>...    classify messages in the background
  show                print the current table
  wait                wait for outstanding work, then print the table
  reset               forget classification results
  help                show this help
  quit                leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Filter(String),
    From(String),
    To(String),
    Search(Option<String>),
    Clear,
    Classify(Vec<MessageId>),
    Show,
    Wait,
    Reset,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// Filter text after the command word is kept raw; trimming happens when the
/// filter is applied.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim_start().trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

    let command = match word.trim() {
        "filter" => ReplCommand::Filter(rest.to_owned()),
        "from" => ReplCommand::From(rest.trim().to_owned()),
        "to" => ReplCommand::To(rest.trim().to_owned()),
        "search" => {
            ReplCommand::Search(if rest.trim().is_empty() { None } else { Some(rest.to_owned()) })
        }
        "clear" => ReplCommand::Clear,
        "classify" => ReplCommand::Classify(parse_ids(rest)?),
        "show" | "ls" => ReplCommand::Show,
        "wait" => ReplCommand::Wait,
        "reset" => ReplCommand::Reset,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn parse_ids(rest: &str) -> Result<Vec<MessageId>, String> {
    let ids = rest
        .split_whitespace()
        .map(|token| token.parse::<MessageId>().map_err(|_| format!("invalid message id `{token}`")))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err("classify needs at least one message id".to_owned());
    }
    Ok(ids)
}

/// Run the session until `quit` or end of input.
pub async fn run(dash: Dashboard) -> Result<(), CliError> {
    let watcher = spawn_outcome_watcher(dash.subscribe());
    dash.activate().await;
    print!("{}", render(&dash.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(command)) => {
                if !execute(&dash, command).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => eprintln!("{message}"),
        }
        prompt()?;
    }

    watcher.abort();
    Ok(())
}

/// Apply one command. Returns `false` when the session should end.
async fn execute(dash: &Dashboard, command: ReplCommand) -> bool {
    match command {
        ReplCommand::Filter(text) => dash.set_filter(text),
        ReplCommand::From(from) => {
            let to = dash.snapshot().filter.date_range().1.to_owned();
            dash.set_date_range(from, to);
        }
        ReplCommand::To(to) => {
            let from = dash.snapshot().filter.date_range().0.to_owned();
            dash.set_date_range(from, to);
        }
        ReplCommand::Search(text) => {
            if let Some(text) = text {
                dash.set_filter(text);
            }
            dash.search().await;
            print!("{}", render(&dash.snapshot()));
        }
        ReplCommand::Clear => {
            dash.clear_filter().await;
            print!("{}", render(&dash.snapshot()));
        }
        ReplCommand::Classify(ids) => {
            for id in ids {
                // Detached: the watcher reports the outcome.
                drop(dash.spawn_classify(id));
                println!("classifying {id}...");
            }
        }
        ReplCommand::Show => print!("{}", render(&dash.snapshot())),
        ReplCommand::Wait => print!("{}", render(&dash.settled().await)),
        ReplCommand::Reset => {
            dash.reset();
            println!("classification results cleared");
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit => return false,
    }
    true
}

fn prompt() -> Result<(), CliError> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn spawn_outcome_watcher(mut rx: watch::Receiver<DashboardState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut seen = rx.borrow_and_update().ops.clone();
        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().ops.clone();
            for (id, outcome) in resolved_since(&seen, &current) {
                println!("\n[{id}] Classification: {outcome}");
            }
            seen = current;
        }
    })
}
