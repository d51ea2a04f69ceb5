mod builtins;
mod error;
mod launcher;
mod parser;
mod shell;
mod utils;

use anyhow::Context;

use crate::shell::Shell;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let shell = Shell::new();
    shell.run().context("shell stopped")?;
    Ok(())
}
