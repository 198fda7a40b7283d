use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use microjava::bytecode::disasm::print_listing;
use microjava::bytecode::{DebugSymbols, ObjectFile};
use microjava::frontend::Lexer;
use microjava::frontend::token_dumper::TokenDumper;
use microjava::runtime::{ConsoleIo, Vm};

#[derive(Parser, Debug)]
#[command(name = "mj")]
#[command(about = "MicroJava compiler and virtual machine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a .mj source file to a .obj file next to it
    Compile {
        source: PathBuf,
        /// Also write a .sym debug symbols file
        #[arg(long)]
        symbols: bool,
        /// Print the program's symbol table
        #[arg(long)]
        dump_symbols: bool,
    },
    /// Run an object file on stdin/stdout
    Run {
        object: PathBuf,
        /// Log every executed instruction
        #[arg(long)]
        trace: bool,
    },
    /// Disassemble an object file
    Dis { object: PathBuf },
    /// Print the token stream of a source file
    Tokens {
        source: PathBuf,
        #[arg(long)]
        no_color: bool,
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let trace = matches!(cli.command, Command::Run { trace: true, .. });
    init_logging(trace);

    if let Err(e) = dispatch(cli.command) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(trace: bool) {
    let default = if trace { "warn,microjava::runtime::vm=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Compile {
            source,
            symbols,
            dump_symbols,
        } => compile(&source, symbols, dump_symbols),
        Command::Run { object, .. } => run(&object),
        Command::Dis { object } => {
            let obj = load_object(&object)?;
            print_listing(&obj, load_symbols(&object)?.as_ref());
            Ok(())
        }
        Command::Tokens {
            source,
            no_color,
            pretty,
        } => {
            let text = read_source(&source)?;
            let (tokens, diagnostics) = Lexer::tokenize(&text);

            let mut dumper = TokenDumper::new();
            if no_color {
                dumper = dumper.no_color();
            }
            if pretty {
                dumper = dumper.pretty();
            }
            dumper.dump(&tokens);
            eprint!("{}", diagnostics);
            Ok(())
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn compile(source: &Path, write_symbols: bool, dump_symbols: bool) -> Result<()> {
    let text = read_source(source)?;

    let out = match microjava::compile(&text) {
        Ok(out) => out,
        Err(failure) => {
            eprint!("{}", failure.diagnostics);
            bail!("{}", failure);
        }
    };

    if dump_symbols {
        print!("{}", out.symbol_dump);
    }

    let obj_path = source.with_extension("obj");
    let mut file = fs::File::create(&obj_path)
        .with_context(|| format!("failed to create {}", obj_path.display()))?;
    out.object
        .write_to(&mut file)
        .with_context(|| format!("failed to write {}", obj_path.display()))?;

    if write_symbols {
        let sym_path = source.with_extension("sym");
        let bytes = out.symbols.to_bytes().context("failed to encode debug symbols")?;
        fs::write(&sym_path, bytes)
            .with_context(|| format!("failed to write {}", sym_path.display()))?;
    }

    println!("no errors");
    Ok(())
}

fn run(object: &Path) -> Result<()> {
    let obj = load_object(object)?;
    let mut vm = Vm::new(&obj);
    if let Some(symbols) = load_symbols(object)? {
        vm = vm.with_symbols(symbols);
    }

    let mut io = ConsoleIo::new();
    vm.run(&mut io)?;
    Ok(())
}

fn load_object(path: &Path) -> Result<ObjectFile> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    ObjectFile::from_bytes(&bytes).with_context(|| format!("{} is not an object file", path.display()))
}

/// The `.sym` file next to `object`, if there is one.
fn load_symbols(object: &Path) -> Result<Option<DebugSymbols>> {
    let path = object.with_extension("sym");
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let symbols = DebugSymbols::from_bytes(&bytes)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(Some(symbols))
}
