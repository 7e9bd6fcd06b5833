//! hash-password command - bcrypt hash for the local credential store

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, IsTerminal};

const PROMPT: &str = "Enter password to hash: ";

pub fn execute(password: Option<String>, cost: u32) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None if io::stdin().is_terminal() => {
            rpassword::prompt_password(PROMPT).context("Failed to read password")?
        }
        None => read_password(io::stdin().lock())?,
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    let hash = netboot_crypto::hash_password(&password, cost).context("Failed to hash password")?;
    println!("{}", hash);
    Ok(())
}

/// First line of piped input without its line terminator
fn read_password(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}
