// src/cli/args.rs
use clap::Args;

/// Launch flags shared by every child-spawning command. Each command embeds
/// these through `#[command(flatten)]` next to its own flags.
#[derive(Args, Debug, Default, Clone)]
pub struct RuntimeArgs {
    /// Directory of the target application. Defaults to the current directory.
    #[arg(long)]
    pub base_dir: Option<String>,

    /// Force TypeScript mode on or off, overriding every detection source.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub typescript: Option<bool>,

    /// Deprecated string spelling of `--typescript`; only "true" and "false"
    /// count, anything else falls through to detection.
    #[arg(long = "ts")]
    pub ts: Option<String>,

    /// Regenerate type declarations before launching.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub declarations: Option<bool>,

    /// Compiler register hook to inject instead of the ts-node default.
    /// Passing this also switches TypeScript mode on.
    #[arg(long)]
    pub tscompiler: Option<String>,

    /// Print the composed command instead of spawning it.
    #[arg(long)]
    pub dry_run: bool,

    /// Interpreter binary to spawn. Defaults to `node` from PATH.
    #[arg(long)]
    pub node: Option<String>,
}
