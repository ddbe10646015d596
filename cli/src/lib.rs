use anyhow::Result;
use docsearch_core::{SearchOutcome, SearchStatus, Searcher, Strategy};
use std::io::{BufRead, Write};

pub const TERM_PROMPT: &str = "Please enter search term or phrase (cannot be null) or \"q\" to quit.";
pub const INVALID_NOTICE: &str =
    "Invalid input(s). Please type \"q\" to quit application or press enter to continue.";

/// "Please choose search method ...: 1. String Match, 2. Regular Expression, 3. Indexed"
pub fn method_prompt() -> String {
    let choices: Vec<String> = Strategy::ALL.iter().map(|s| format!("{}. {}", s.selector(), s.label())).collect();
    format!("Please choose search method (input corresponding number): {}", choices.join(", "))
}

fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("q")
}

/// Read one line without its newline. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

/// Prompt until a usable term and method are given. `None` means quit.
fn prompt_query<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<(String, Strategy)>> {
    loop {
        writeln!(out, "{TERM_PROMPT}")?;
        let Some(term) = read_line(input)? else { return Ok(None) };
        if is_quit(&term) {
            return Ok(None);
        }
        writeln!(out, "{}", method_prompt())?;
        let Some(method) = read_line(input)? else { return Ok(None) };
        match method.parse::<Strategy>() {
            Ok(strategy) if !term.trim().is_empty() => return Ok(Some((term, strategy))),
            _ => {
                writeln!(out, "{INVALID_NOTICE}")?;
                match read_line(input)? {
                    Some(line) if !is_quit(&line) => continue,
                    _ => return Ok(None),
                }
            }
        }
    }
}

/// Print ranked results to `out` and diagnostics to `err`.
pub fn render<W: Write, E: Write>(searcher: &Searcher, outcome: &SearchOutcome, out: &mut W, err: &mut E) -> Result<()> {
    for diag in &outcome.diagnostics {
        writeln!(err, "{diag}")?;
    }
    match outcome.status {
        SearchStatus::CorpusEmpty => writeln!(
            err,
            "Found no text files. Please add appropriate text files to: {}",
            searcher.config().corpus_dir.display()
        )?,
        SearchStatus::IndexUnavailable => writeln!(err, "No indexed results available.")?,
        SearchStatus::Ranked => {
            writeln!(out, "Search results ({}): \n", outcome.strategy.label())?;
            for r in &outcome.results {
                writeln!(out, "\t{} - {} matches\n", r.name, r.count)?;
            }
        }
    }
    writeln!(out, "Elapsed Time: {} ms", outcome.elapsed.as_millis())?;
    Ok(())
}

/// The interactive loop: prompt, search, print, repeat until `q` or end of input.
pub fn run_interactive<R: BufRead, W: Write, E: Write>(
    searcher: &mut Searcher,
    input: &mut R,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    while let Some((term, strategy)) = prompt_query(input, out)? {
        writeln!(out, "SearchTerm is: {term}\n")?;
        match searcher.search(&term, strategy) {
            Ok(outcome) => render(searcher, &outcome, out, err)?,
            Err(e) => writeln!(err, "{e}")?,
        }
    }
    out.flush()?;
    Ok(())
}
