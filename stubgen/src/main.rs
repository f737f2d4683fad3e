//! Syscall stub generator driver.
//!
//! Reads a `DEF_SYSCALL` table and writes the requested artifacts: a
//! definitions/prototypes header (`-d`) and/or an assembly stubs file
//! (`-s`). With `--verify` the table is only validated. The table is always
//! parsed to completion before anything is written, so a failing run never
//! leaves a partial artifact behind for the build system to pick up.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use stubgen_core::emit::{render_std_header, render_stubs_file};
use stubgen_core::table::{parse_table, SyscallRecord};

/// Generate syscall number defines, C prototypes and assembly stubs
/// from a DEF_SYSCALL table.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the syscall table.
    table: PathBuf,

    /// Sanity check the syscall table. Do not generate any files.
    #[arg(short, long)]
    verify: bool,

    /// Path to the syscall definitions header file.
    #[arg(short = 'd', long = "std-header")]
    std_header: Option<PathBuf>,

    /// Path to the syscall assembly stubs file.
    #[arg(short = 's', long = "stubs-file")]
    stubs_file: Option<PathBuf>,
}

impl Args {
    /// Not verifying and nowhere to write is a usage error, caught before
    /// the table file is even opened.
    fn requests_work(&self) -> bool {
        self.verify || self.std_header.is_some() || self.stubs_file.is_some()
    }
}

const EXIT_USAGE: u8 = 1;
const EXIT_BAD_TABLE: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    if !args.requests_work() {
        let _ = Args::command().print_help();
        return ExitCode::from(EXIT_USAGE);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(EXIT_BAD_TABLE)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let source = std::fs::read_to_string(&args.table)
        .with_context(|| format!("failed to read syscall table {}", args.table.display()))?;

    let records = parse_table(&source)?;
    warn_duplicates(&records);

    if args.verify {
        return Ok(());
    }

    if let Some(path) = &args.std_header {
        std::fs::write(path, render_std_header(&records))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if let Some(path) = &args.stubs_file {
        let contents = render_stubs_file(&records, args.std_header.as_deref());
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Duplicate numbers or names produce conflicting defines and symbols in
/// the generated files. The table format has always allowed them, so keep
/// generating, but make the conflict visible in the build log.
fn warn_duplicates(records: &[SyscallRecord]) {
    let mut numbers = HashSet::new();
    let mut names = HashSet::new();
    for rec in records {
        if !numbers.insert(rec.number) {
            log::warn!("duplicate syscall number {} ({})", rec.number_lit, rec.name);
        }
        if !names.insert(rec.name.as_str()) {
            log::warn!("duplicate syscall name {}", rec.name);
        }
    }
}
