//! Hidden command to generate shell completions.

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

/// Generate shell completion scripts.
#[derive(Args, Debug)]
pub struct CompletionCommand {
    /// Shell to generate completions for (e.g. bash, zsh)
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionCommand {
    pub fn execute(&self) {
        let mut cmd = crate::Cli::command();
        generate(self.shell, &mut cmd, "proyecto", &mut std::io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use crate::{Cli, Commands};
    use clap::Parser;
    use clap_complete::Shell;

    #[test]
    fn test_completion_shell() {
        let cli = Cli::try_parse_from(["proyecto", "completion", "zsh"]).unwrap();
        match cli.command {
            Commands::Completion(cmd) => assert_eq!(cmd.shell, Shell::Zsh),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
