use clap::Parser;

pub mod args;
pub mod handlers;

/// The raw help template. Style placeholders are swapped for ANSI codes at
/// runtime so the output degrades cleanly on dumb terminals.
const HELP_TEMPLATE: &str = "\
<title>eggcup</title> - develop and test Node.js applications without ceremony.

<group>Usage:</group> eggcup <COMMAND> [OPTIONS] [ARGS]...

<group>Commands:</group>
  <cmd>dev</cmd>   Start the application locally for development. <dim>(alias: d)</dim>
  <cmd>test</cmd>  Run the application's test suite through its runner. <dim>(alias: t)</dim>

Shared flags such as <cmd>--base-dir</cmd>, <cmd>--typescript</cmd> and <cmd>--dry-run</cmd> live on
each command. Run <cmd>eggcup <COMMAND> --help</cmd> for the full list.
";

/// Builds the color-aware full help string at runtime.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    // Define styles. If colors are disabled, they are empty strings.
    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan (for commands)
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let dim = if use_colors { "\x1b[2m" } else { "" }; // Dim
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = HELP_TEMPLATE
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// eggcup: a zero-configuration runner for Node.js server applications.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    // Use `help_template` to take full control of the output.
    help_template = { build_help_string() },
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The command followed by everything destined for its handler. Kept as
    /// one opaque sequence so each handler can parse its own grammar.
    #[arg()]
    pub args: Vec<String>,
}

impl Cli {
    /// The rendered help, shared with the bare `eggcup` invocation.
    pub fn render_help() -> &'static str {
        build_help_string()
    }
}
