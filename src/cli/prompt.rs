//! Yes/no confirmation prompts

use std::io::{self, BufRead, Write};

use crate::app::catalog::filters::parse_bool;

/// Ask a yes/no question on the terminal; anything unrecognised means no
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm_with(prompt, &mut stdin.lock(), &mut stdout.lock())
}

pub fn confirm_with<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;
    Ok(parse_bool(&response).unwrap_or(false))
}
