use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use disasm_8086::Decoder;
use log::info;

const EXIT_SUCCESS: u8 = 0;
const EXIT_USAGE: u8 = 1;
const EXIT_EXTENSION: u8 = 2;
const EXIT_IO: u8 = 3;

const EXTENSIONS: [&str; 2] = ["com", "exe"];

#[derive(Parser)]
#[command(name = "disasm8086", about = "Print a mnemonic listing of a .com/.exe image")]
struct Args {
  /// Image to disassemble, read as a flat opcode stream from offset 0
  file: PathBuf,
}

fn main() -> ExitCode {
  env_logger::init();
  let stdout = std::io::stdout();
  let status = run_cli(std::env::args_os(), &mut stdout.lock());
  ExitCode::from(status)
}

/// Parses `argv`, writes the listing to `out` and returns the exit status.
/// Truncated images still exit with success.
fn run_cli<I, T>(argv: I, out: &mut impl Write) -> u8
where
  I: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
{
  let args = match Args::try_parse_from(argv) {
    Ok(args) => args,
    Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
      let _ = write!(out, "{}", err.render());
      return EXIT_SUCCESS;
    }
    Err(err) => {
      let _ = err.print();
      return EXIT_USAGE;
    }
  };

  if !has_image_extension(&args.file) {
    let _ = writeln!(out, "Invalid program name");
    return EXIT_EXTENSION;
  }

  match run(&args.file, out) {
    Ok(()) => EXIT_SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      EXIT_IO
    }
  }
}

fn run(path: &Path, out: &mut impl Write) -> Result<()> {
  let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
  info!("loaded {} bytes from {}", bytes.len(), path.display());

  for line in Decoder::new(&bytes) {
    match line {
      Ok(line) => writeln!(out, "{line}")?,
      Err(err) => writeln!(out, "{err}")?,
    }
  }
  out.flush()?;
  Ok(())
}

fn has_image_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
