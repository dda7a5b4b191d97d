//! Interactive session started when `hypermapper` runs without a subcommand.
//!
//! Each line is split with shell quoting rules and dispatched as if it had
//! been given on the command line. `help` lists the subcommands, `help
//! <name>` shows one subcommand's usage, and `quit`, `exit` or end of input
//! leave the session.

use crate::cli::{PROGRAM, VERSION};
use crate::dispatch::{FrontEnd, Outcome, Session};
use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_heading, print_info, print_success};

use console::Term;
use std::io::{self, BufRead, BufReader, Stdin};

const PROMPT: &str = "hypermapper> ";

/// Line-oriented front end reading commands from `R`.
pub struct ConsoleFrontEnd<R> {
    input: R,
}

impl ConsoleFrontEnd<BufReader<Stdin>> {
    /// Front end reading from standard input.
    pub fn new() -> Self {
        Self::with_input(BufReader::new(io::stdin()))
    }
}

impl Default for ConsoleFrontEnd<BufReader<Stdin>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> ConsoleFrontEnd<R> {
    pub fn with_input(input: R) -> Self {
        Self { input }
    }
}

/// One parsed line of input.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    Quit,
    Help(Option<String>),
    Command(Vec<String>),
}

fn parse_line(line: &str) -> Result<Line, shell_words::ParseError> {
    let mut words = shell_words::split(line.trim())?;
    Ok(match words.first().map(String::as_str) {
        None => Line::Blank,
        Some("quit" | "exit") => Line::Quit,
        Some("help" | "?") => Line::Help(words.drain(..).nth(1)),
        Some(_) => Line::Command(words),
    })
}

fn list_commands(session: &dyn Session) {
    println!("Available commands:");
    for (name, about) in session.commands() {
        print_info(&format!("  {name:<10}"), about);
    }
    println!("Type 'help <command>' for its options, 'quit' to leave.");
}

fn report(result: CliResult<Outcome>) {
    match result {
        Ok(Outcome::Completed { command, log_path }) => {
            print_success(&format!("{command} finished (log: {})", log_path.display()));
        }
        Ok(Outcome::Interactive) => {}
        Err(CliError::Parse(e)) if e.use_stderr() => eprintln!("{}", e.render()),
        Err(CliError::Parse(e)) => println!("{}", e.render()),
        Err(e) => print_error(&e),
    }
}

impl<R: BufRead> FrontEnd for ConsoleFrontEnd<R> {
    fn run(&mut self, session: &mut dyn Session) -> CliResult<()> {
        print_heading(&format!("{PROGRAM} {VERSION}"));
        list_commands(session);

        let term = Term::stdout();
        let mut buffer = String::new();
        loop {
            term.write_str(PROMPT)?;
            term.flush()?;

            buffer.clear();
            if self.input.read_line(&mut buffer)? == 0 {
                term.write_line("")?;
                break;
            }

            match parse_line(&buffer) {
                Ok(Line::Blank) => {}
                Ok(Line::Quit) => break,
                Ok(Line::Help(None)) => list_commands(session),
                Ok(Line::Help(Some(name))) => report(session.submit(&[name, "--help".to_string()])),
                Ok(Line::Command(argv)) => report(session.submit(&argv)),
                Err(e) => print_error(&e),
            }
        }
        Ok(())
    }
}
