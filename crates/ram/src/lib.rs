//! The `ram` command-line front end: tokenize, parse, and execute RAM
//! assembly programs.

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use cli_support::CommonArgs;
use ram_error::Result;
use ram_vm::{VecInput, VecOutput, VirtualMachine};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "ram", author, version, about = "Assemble, inspect, and run RAM programs")]
#[command(styles = STYLES)]
pub struct Cli {
    #[command(flatten)]
    pub args: CommonArgs,
}

/// Tokenize, parse, and (unless `-n`) execute the program named by `cli`.
pub fn run(cli: &Cli) -> Result<()> {
    let source = cli_support::read_source(&cli.args.program)?;

    if cli.args.tokenize {
        let tokens = ram_parser::lexer().tokenize(&source)?;
        cli_support::dump_tokens(&tokens);
    }

    let program = ram_parser::parse(&source)?;

    if cli.args.parse {
        anstream::println!("{}", ram_parser::emit(&program));
    }

    if cli.args.no_execute {
        return Ok(());
    }

    let mut vm = VirtualMachine::new(program, VecInput::new(cli.args.input.clone()), VecOutput::new());
    vm.run()?;

    cli_support::print_output(&vm.output.values);

    if cli.args.verbose {
        cli_support::print_diagnostics(vm.steps(), vm.is_halted(), vm.accumulator());
    }

    Ok(())
}
