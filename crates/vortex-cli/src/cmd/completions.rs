use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `vx completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `vx` to stdout.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    generate(args.shell, command, "vx", &mut out);
    Ok(())
}
