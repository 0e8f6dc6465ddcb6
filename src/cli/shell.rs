use std::{
    fmt,
    io::{self, BufRead, IsTerminal, Write},
};

use shell_words::split;
use tracing::debug;

use super::commands::dispatch;
use super::context::{CliError, CommandError, LoopControl, ShellContext};
use super::output;

const PROMPT: &str = "kharcha> ";

/// Runs the shell against stdin until `exit` or end of input.
pub fn run_cli() -> Result<(), CliError> {
    let mut context = ShellContext::new()?;
    let interactive = io::stdin().is_terminal();
    if interactive {
        output::info("Type `help` for a list of commands.");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while context.running {
        if interactive {
            print!("{PROMPT}");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match handle_line(&mut context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => context.running = false,
            Err(err) => context.report_error(err),
        }
    }

    context.manager.save()?;
    debug!("shell session finished");
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match parse_command_line(trimmed) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((command, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = command.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    dispatch(context, &command, &args)
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse input: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line(r#"expense add 42 "Food & Dining" --desc "Team lunch""#)
            .unwrap();
        assert_eq!(
            tokens,
            ["expense", "add", "42", "Food & Dining", "--desc", "Team lunch"]
        );
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        assert!(parse_command_line(r#"expense add 42 "Groceries"#).is_err());
    }
}
