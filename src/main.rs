use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mips_ensemble::asm::MemoryImage;
use mips_ensemble::err::{Diagnostic, Error as _};
use mips_ensemble::sim::io::StdIO;
use mips_ensemble::sim::{execute_with_io, Outcome, RunSummary};
use mips_ensemble::{generate, isa, lex, parse, validate};

/// Assemble, check, and run a MIPS assembly file
///
/// By default, the file is only checked: diagnostics are printed to `stderr`
/// and the exit code reports whether any were found.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the assembly file
    file: PathBuf,
    /// Assemble and execute the program, using this process's stdin/stdout as its console
    #[arg(short, long)]
    run: bool,
    /// Maximum number of instructions to execute
    #[arg(long, value_name = "N", default_value_t = 1_000_000)]
    max_steps: u64,
    /// Print the assembled memory image, disassembling the text segment
    #[arg(short, long)]
    dump: bool,
    /// Assemble even if the validator reports diagnostics
    #[arg(long)]
    no_validate: bool,
}

/// CLI error
#[derive(Debug)]
enum Error {
    /// Error reading the source file
    ReadFile(PathBuf, std::io::Error),
    /// The source had diagnostics
    Diagnostics(usize),
    /// The assembler failed
    Assembly(String),
    /// The simulator faulted
    Fault(String),
    /// The program did not finish within the step budget
    BudgetExceeded(u64),
}

fn report(file: &str, diags: &[Diagnostic]) {
    for diag in diags {
        eprintln!("{file}:{diag}");
    }
}

fn dump(image: &MemoryImage) {
    let sym = image.symbol_table();
    let text = image.text_range();
    for (addr, word) in image.mem().word_iter() {
        if let Some(label) = sym.rev_lookup_label(addr) {
            println!("{label}:");
        }
        match text.contains(&addr) {
            true  => println!("  {addr:08X}  {word:08X}  {}", isa::disassemble(word, addr)),
            false => println!("  {addr:08X}  {word:08X}"),
        }
    }
}

/// Maps a finished run to the program's exit code, or an error if it did not terminate.
fn exit_status(summary: RunSummary, max_steps: u64) -> Result<Option<i32>, Error> {
    match summary.outcome {
        Outcome::BudgetExceeded => Err(Error::BudgetExceeded(max_steps)),
        outcome => {
            log::info!("program {outcome} ({} instructions)", summary.instructions_executed);
            Ok(Some(summary.exit_code.unwrap_or(1)))
        },
    }
}

/// Runs the application, returning the program's exit code if it ran.
fn run() -> Result<Option<i32>, Error> {
    let args = Cli::parse();
    let file = args.file.display().to_string();
    let src = std::fs::read_to_string(&args.file).map_err(|e| Error::ReadFile(args.file.clone(), e))?;

    let (tokens, lex_diags) = lex(&src);
    let (nodes, parse_diags) = parse(&src, &tokens);
    let val_diags = validate(&src, &tokens, &nodes);
    let diags: Vec<_> = lex_diags.into_iter()
        .chain(parse_diags)
        .chain(val_diags)
        .collect();
    report(&file, &diags);
    log::debug!("{} tokens, {} nodes, {} diagnostics", tokens.len(), nodes.len(), diags.len());

    if !diags.is_empty() && !args.no_validate {
        return Err(Error::Diagnostics(diags.len()));
    }
    if !args.run && !args.dump {
        return Ok(None);
    }

    let image = generate(&src, &tokens, &nodes).map_err(|e| {
        let mut msg = format!("{file}: {e}");
        if let Some(help) = e.help() {
            msg.push_str(&format!("\n  help: {help}"));
        }
        Error::Assembly(msg)
    })?;
    if args.dump {
        dump(&image);
    }
    if !args.run {
        return Ok(None);
    }

    let summary = execute_with_io(&image, args.max_steps, StdIO)
        .map_err(|e| Error::Fault(e.to_string()))?;
    exit_status(summary, args.max_steps)
}

fn main() -> ExitCode {
    env_logger::init();

    let msg = match run() {
        Ok(None) => return ExitCode::SUCCESS,
        Ok(Some(code)) => return ExitCode::from(code as u8),
        Err(Error::ReadFile(file, e)) => format!("can't read file `{}`: {e}", file.display()),
        Err(Error::Diagnostics(n)) => format!("{n} diagnostic(s) found"),
        Err(Error::Assembly(msg)) => msg,
        Err(Error::Fault(msg)) => format!("simulator fault: {msg}"),
        Err(Error::BudgetExceeded(n)) => format!("program stopped: step budget of {n} exceeded"),
    };
    eprintln!("\n[error] {msg}");
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use mips_ensemble::sim::{Outcome, RunSummary};

    use super::{exit_status, Error};

    fn summary(outcome: Outcome) -> RunSummary {
        RunSummary { outcome, exit_code: outcome.exit_code(), instructions_executed: 10 }
    }

    #[test]
    fn test_exit_status() {
        assert!(matches!(exit_status(summary(Outcome::Exited(3)), 10), Ok(Some(3))));
        assert!(matches!(exit_status(summary(Outcome::RanOffEnd), 10), Ok(Some(0))));
        assert!(matches!(exit_status(summary(Outcome::BudgetExceeded), 10), Err(Error::BudgetExceeded(10))));
    }
}
