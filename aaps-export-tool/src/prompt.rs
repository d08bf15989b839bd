//! Interactive prompts.

use aaps_export::OBJECTIVES;
use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};

const PASSWORD_PROMPT: &str = "Enter your master password: ";

/// Returns the password given on the command line (or via the environment),
/// asking for it otherwise.
///
/// On a terminal the input is masked; piped stdin is read as a plain line.
pub fn resolve_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        let password =
            rpassword::prompt_password(PASSWORD_PROMPT).context("failed to read password")?;
        non_empty(password)
    } else {
        read_password(&mut stdin.lock(), &mut io::stderr())
    }
}

fn read_password(input: &mut impl BufRead, output: &mut impl Write) -> Result<String> {
    write!(output, "{PASSWORD_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("failed to read password")?;
    non_empty(line.trim_end_matches(['\r', '\n']).to_string())
}

fn non_empty(password: String) -> Result<String> {
    if password.is_empty() {
        bail!("no password given");
    }
    Ok(password)
}

/// Asks which objectives to mark as completed.
///
/// Already completed objectives are pre-selected: an empty answer selects them.
pub fn select_objectives(completed: &[u32]) -> Result<Vec<u32>> {
    let stdin = io::stdin();
    select_objectives_from(&mut stdin.lock(), &mut io::stderr(), completed)
}

fn select_objectives_from(
    input: &mut impl BufRead,
    output: &mut impl Write,
    completed: &[u32],
) -> Result<Vec<u32>> {
    writeln!(output, "Objectives (unselected ones will not be affected):")?;
    for objective in &OBJECTIVES {
        let mark = if completed.contains(&objective.number) { "x" } else { " " };
        writeln!(output, "  [{mark}] {:>2}  {}", objective.number, objective.name)?;
    }
    write!(output, "Select objectives to mark as completed (e.g. 1,2,4): ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(completed.to_vec());
    }

    let mut selected = Vec::new();
    for part in line.split([',', ' ']).filter(|p| !p.is_empty()) {
        match part.parse::<u32>() {
            Ok(n) => selected.push(n),
            Err(_) => bail!("`{part}` is not an objective number"),
        }
    }
    Ok(selected)
}
