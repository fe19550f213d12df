use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::io::Write;

/// Print shell completions.
#[derive(Parser)]
#[group(skip)]
pub struct PrintCompletions {
    /// Shell.
    #[arg(value_enum, default_value_t = Shell::Bash)]
    shell: Shell,
}

impl PrintCompletions {
    pub fn run(self) {
        self.write_to(&mut std::io::stdout());
    }

    fn write_to(&self, out: &mut impl Write) {
        let mut cmd = crate::Command::command();
        let bin = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, bin, out);
    }
}
