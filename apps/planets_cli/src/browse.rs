//! Interactive list/detail browser driven by line commands.

use std::io::Write;

use anyhow::Result;
use client_core::{
    enrich_residents, DetailTicket, ListTicket, PageRequest, PlanetSource, ViewState,
    ViewStateController,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::render;

const HELP: &str = "\
Commands:
  n, next            next page
  p, prev            previous page
  o, open <N|name>   show residents of a planet
  b, back            return to the list
  r, reload          reload the first page
  h, help            this help
  q, quit            exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Open(String),
    Back,
    Reload,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<BrowseCommand> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let command = match verb.to_ascii_lowercase().as_str() {
        "n" | "next" => BrowseCommand::Next,
        "p" | "prev" | "previous" => BrowseCommand::Previous,
        "o" | "open" if !rest.is_empty() => BrowseCommand::Open(rest.to_string()),
        "b" | "back" => BrowseCommand::Back,
        "r" | "reload" => BrowseCommand::Reload,
        "h" | "help" | "?" => BrowseCommand::Help,
        "q" | "quit" | "exit" => BrowseCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Maps a 1-based card index or a case-insensitive planet name to the planet's exact name.
pub fn resolve_target(state: &ViewState, target: &str) -> Option<String> {
    let ViewState::ListLoaded(list) = state else {
        return None;
    };
    if let Ok(index) = target.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| list.page.results.get(i))
            .map(|planet| planet.name.clone());
    }
    list.page
        .results
        .iter()
        .find(|planet| planet.name.eq_ignore_ascii_case(target))
        .map(|planet| planet.name.clone())
}

fn show<S: PlanetSource>(controller: &ViewStateController<S>, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", render::state(controller.state()))?;
    Ok(())
}

async fn run_list<S: PlanetSource>(
    controller: &mut ViewStateController<S>,
    ticket: ListTicket,
    out: &mut impl Write,
) -> Result<()> {
    show(controller, out)?;
    let result = controller.source().fetch_page(&ticket.request).await;
    controller.complete_list(ticket, result);
    show(controller, out)
}

async fn run_detail<S: PlanetSource>(
    controller: &mut ViewStateController<S>,
    ticket: DetailTicket,
    out: &mut impl Write,
) -> Result<()> {
    show(controller, out)?;
    let result = enrich_residents(controller.source(), &ticket.planet).await;
    controller.complete_detail(ticket, result);
    show(controller, out)
}

pub async fn run<S: PlanetSource>(source: S, start: PageRequest) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    session(source, start, input, &mut std::io::stdout()).await
}

/// Loads `start`, then applies one command per input line until `q` or end of input.
pub async fn session<S, R, W>(source: S, start: PageRequest, input: R, out: &mut W) -> Result<()>
where
    S: PlanetSource,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut controller = ViewStateController::new(source);
    let ticket = controller.request_page(start);
    run_list(&mut controller, ticket, out).await?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            writeln!(out, "Unknown command. Type `h` for help.")?;
            continue;
        };

        match command {
            BrowseCommand::Next => match controller.request_next() {
                Some(ticket) => run_list(&mut controller, ticket, out).await?,
                None => writeln!(out, "No next page.")?,
            },
            BrowseCommand::Previous => match controller.request_previous() {
                Some(ticket) => run_list(&mut controller, ticket, out).await?,
                None => writeln!(out, "No previous page.")?,
            },
            BrowseCommand::Open(target) => {
                let ticket = resolve_target(controller.state(), &target)
                    .and_then(|name| controller.request_detail(&name));
                match ticket {
                    Some(ticket) => run_detail(&mut controller, ticket, out).await?,
                    None => writeln!(out, "No residents to show for `{target}`.")?,
                }
            }
            BrowseCommand::Back => {
                if controller.back() {
                    show(&controller, out)?;
                } else {
                    writeln!(out, "Already at the list.")?;
                }
            }
            BrowseCommand::Reload => {
                let ticket = controller.request_page(PageRequest::Default);
                run_list(&mut controller, ticket, out).await?;
            }
            BrowseCommand::Help => write!(out, "{HELP}")?,
            BrowseCommand::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/browse_tests.rs"]
mod tests;
