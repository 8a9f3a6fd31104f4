//! Command-line argument definitions for the compiler core driver.

use clap::Parser;

/// Compiler core driver: runs the registered passes over the worked-example
/// compilation units and reports any diagnostics they raise.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Comma-separated list of passes to enable. Every pass starts disabled;
    /// naming a pass here also transitively enables whatever it depends on.
    #[clap(short = 'p', long = "passes", value_delimiter = ',')]
    pub passes: Vec<String>,

    /// Lists every registered pass, in registration order, and exits.
    #[clap(long)]
    pub list_passes: bool,

    /// Prints the resolved AST once hierarchy checking has run.
    #[clap(long)]
    pub print_ast: bool,

    /// Prints the generated TIR once code generation has run.
    #[clap(long)]
    pub emit_tir: bool,

    /// Raises the diagnostic engine's debug verbosity; repeatable.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn passes_flag_splits_on_commas() {
        let args = Args::parse_from(["joosc", "-p", "ast-builder,codegen", "-vv"]);
        assert_eq!(args.passes, vec!["ast-builder".to_string(), "codegen".to_string()]);
        assert_eq!(args.verbose, 2);
        assert!(!args.print_ast);
    }

    #[test]
    fn defaults_have_no_passes_selected() {
        let args = Args::parse_from(["joosc"]);
        assert!(args.passes.is_empty());
        assert!(!args.list_passes);
        assert!(!args.emit_tir);
    }
}
