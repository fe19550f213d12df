mod command;
mod error;
mod format;
mod layout;
mod render;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
enum Command {
    Sheet(command::Sheet),
    Plan(command::Plan),
    Formats(command::Formats),
    PrintCompletions(command::PrintCompletions),
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let action = Command::parse();

    match action {
        Command::Sheet(c) => _ = c.run()?,
        Command::Plan(c) => _ = c.run()?,
        Command::Formats(c) => c.run(),
        Command::PrintCompletions(c) => c.run(),
    }

    Ok(())
}
