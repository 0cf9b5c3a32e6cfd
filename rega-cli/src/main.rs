use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use rega::constants::{HEADER_BYTES, MAGIC};
use rega::{decode_header, encode, parse, ParsingError, RuntimeError, VmState};

const DEFAULT_MEMORY_SIZE: usize = 1024;
const CHECKSUM_MODULUS: u64 = 100_000;

/// Compiles a source file to bytecode, or executes a compiled bytecode file.
#[derive(Parser, Debug)]
#[command(name = "rega", about = "compile and execute register assembly bytecode")]
struct Args {
    /// Compile SOURCE to bytecode, skipping the write if it is already up-to-date.
    #[arg(short = 'c', long = "compile", value_name = "SOURCE", conflicts_with = "execute")]
    compile: Option<PathBuf>,

    /// Execute a compiled bytecode FILE.
    #[arg(short = 'e', long = "execute", value_name = "FILE", conflicts_with = "compile")]
    execute: Option<PathBuf>,

    /// Number of integer cells in VM memory.
    #[arg(short = 'm', long = "memory", default_value_t = DEFAULT_MEMORY_SIZE)]
    memory: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match (&args.compile, &args.execute) {
        (Some(source_path), None) => compile(source_path),
        (None, Some(bytecode_path)) => execute_file(bytecode_path, args.memory),
        _ => {
            eprintln!("exactly one of --compile or --execute is required");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn bytecode_path_for(source_path: &Path) -> PathBuf {
    let mut bytecode = source_path.as_os_str().to_owned();
    bytecode.push("_c");
    PathBuf::from(bytecode)
}

/// `(sum of source bytes) mod 100000`. Owned entirely by the CLI driver;
/// the library only ever stores and compares the resulting 32-bit value.
fn checksum(source: &[u8]) -> u32 {
    let sum: u64 = source.iter().map(|&b| u64::from(b)).sum();
    (sum % CHECKSUM_MODULUS) as u32
}

fn is_up_to_date(bytecode_path: &Path, checksum_value: u32) -> bool {
    let existing = match fs::read(bytecode_path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if existing.len() < HEADER_BYTES {
        return false;
    }
    let header = decode_header(&existing);
    header.magic == MAGIC && header.checksum == checksum_value
}

fn compile(source_path: &Path) -> Result<()> {
    let source = fs::read(source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;
    let checksum_value = checksum(&source);
    let bytecode_path = bytecode_path_for(source_path);

    if is_up_to_date(&bytecode_path, checksum_value) {
        log::info!("{} is up-to-date", bytecode_path.display());
        println!("up-to-date");
        return Ok(());
    }

    let source_text = String::from_utf8(source)
        .with_context(|| format!("{} is not valid UTF-8", source_path.display()))?;

    let operations = parse(&source_text).map_err(|err: ParsingError| anyhow::anyhow!(err))?;
    log::debug!("parsed {} operations from {}", operations.len(), source_path.display());

    let bytecode =
        encode(checksum_value, &operations).context("failed to encode compiled operations")?;

    fs::write(&bytecode_path, &bytecode)
        .with_context(|| format!("failed to write {}", bytecode_path.display()))?;

    println!("updated");
    Ok(())
}

fn execute_file(bytecode_path: &Path, memory_size: usize) -> Result<()> {
    let bytecode = fs::read(bytecode_path)
        .with_context(|| format!("failed to read {}", bytecode_path.display()))?;

    if bytecode.len() < HEADER_BYTES || decode_header(&bytecode).magic != MAGIC {
        bail!("Unable to execute bytecode file.");
    }

    let code = &bytecode[HEADER_BYTES..];
    let mut state = VmState::new(memory_size);
    log::debug!("executing {} bytes of code with {} memory cells", code.len(), memory_size);
    rega::execute(code, &mut state).map_err(|err: RuntimeError| anyhow::anyhow!(err))?;

    Ok(())
}
