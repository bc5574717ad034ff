//! The `palgol` command-line front end: tokenize, parse, compile, and
//! (by default) execute Pidgin ALGOL programs.

use std::process::ExitCode;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use cli_support::CommonArgs;
use palgol::compiler::Compiler;
use ram_error::Result;
use ram_vm::{VecInput, VecOutput, VirtualMachine};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "palgol", author, version, about = "Compile and run Pidgin ALGOL programs")]
#[command(styles = STYLES)]
struct Cli {
    #[command(flatten)]
    args: CommonArgs,

    /// Emit the generated RAM assembly before executing.
    #[arg(short = 'c', long = "compile")]
    compile: bool,
}

fn run(cli: &Cli) -> Result<()> {
    let source = cli_support::read_source(&cli.args.program)?;

    if cli.args.tokenize {
        let tokens = palgol::lexer::lexer().tokenize(&source)?;
        cli_support::dump_tokens(&tokens);
    }

    let ast = palgol::parse(&source)?;

    if cli.args.parse {
        anstream::println!("{ast}");
    }

    let program = Compiler::new().compile_ast(&ast)?;

    if cli.compile {
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

fn main() -> ExitCode {
    cli_support::install("palgol", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();
    cli_support::init_tracing(cli.args.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
