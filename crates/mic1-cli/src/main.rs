//! CLI entry point for the Mic-1 simulator binary.

use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use mic1_core::{
    load_control_store, load_program, HaltReason, Machine, MachineConfig, RunState, TraceEvent,
    TraceSink,
};
#[cfg(test)]
use tempfile as _;

mod inspect;

const USAGE_TEXT: &str = "\
Usage: mic1 <program> [options]

Runs a Mic-1 program image against a control-store image.

Options:
  -m, --microprogram <file>  Control-store image (default: microprog.rom)
  -s, --step                 Show machine state and pause between cycles
  -q, --quiet                Suppress load reports and runtime warnings
      --max-cycles <n>       Stop after n cycles
  -h, --help                 Show this help message
";

const DEFAULT_MICROPROGRAM: &str = "microprog.rom";

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    program: PathBuf,
    microprogram: PathBuf,
    step: bool,
    quiet: bool,
    max_cycles: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum ParseResult {
    Args(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut program: Option<PathBuf> = None;
    let mut microprogram: Option<PathBuf> = None;
    let mut step = false;
    let mut quiet = false;
    let mut max_cycles: Option<u64> = None;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }
        if arg == "--step" || arg == "-s" {
            step = true;
            continue;
        }
        if arg == "--quiet" || arg == "-q" {
            quiet = true;
            continue;
        }
        if arg == "--microprogram" || arg == "-m" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --microprogram".to_string())?;
            microprogram = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--max-cycles" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-cycles".to_string())?;
            let parsed = value
                .to_string_lossy()
                .parse::<u64>()
                .map_err(|_| format!("invalid cycle count: {}", value.to_string_lossy()))?;
            max_cycles = Some(parsed);
            continue;
        }

        let text = arg.to_string_lossy();
        if text.starts_with('-') {
            return Err(format!("unknown option: {text}"));
        }
        if program.is_some() {
            return Err(format!("unexpected extra argument: {text}"));
        }
        program = Some(PathBuf::from(arg));
    }

    let program = program.ok_or_else(|| "missing program image argument".to_string())?;
    Ok(ParseResult::Args(RunArgs {
        program,
        microprogram: microprogram.unwrap_or_else(|| PathBuf::from(DEFAULT_MICROPROGRAM)),
        step,
        quiet,
        max_cycles,
    }))
}

/// Prints runtime warnings to stderr as they happen; everything else is
/// rendered by the inspector or the halt report.
struct StderrReporter {
    quiet: bool,
}

impl TraceSink for StderrReporter {
    fn on_event(&mut self, event: TraceEvent) {
        if let TraceEvent::Warning { warning } = event {
            if !self.quiet {
                eprintln!("warning: {warning}");
            }
        }
    }
}

fn load_machine(args: &RunArgs) -> Result<Machine, String> {
    let mut machine = Machine::with_config(&MachineConfig::default());

    let file = File::open(&args.microprogram)
        .map_err(|err| format!("cannot open {}: {err}", args.microprogram.display()))?;
    let report = load_control_store(&mut BufReader::new(file), machine.control_store_mut())
        .map_err(|err| format!("{}: {err}", args.microprogram.display()))?;
    if !args.quiet {
        println!("microprogram loaded: {} instructions", report.words_read);
    }

    let file = File::open(&args.program)
        .map_err(|err| format!("cannot open {}: {err}", args.program.display()))?;
    let report = load_program(&mut BufReader::new(file), machine.memory_mut())
        .map_err(|err| format!("{}: {err}", args.program.display()))?;
    if !args.quiet {
        println!(
            "program loaded: {} body bytes of {} total",
            report.body_read, report.declared_size
        );
    }

    Ok(machine)
}

fn pause_for_enter() {
    print!("\nPress Enter for the next cycle...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

fn report_halt(reason: HaltReason) -> ExitCode {
    match reason {
        HaltReason::HaltInstruction => {
            println!("halt instruction reached; program finished");
            ExitCode::SUCCESS
        }
        HaltReason::Fault(fault) => {
            eprintln!("fault: {fault}");
            ExitCode::FAILURE
        }
    }
}

fn execute(machine: &mut Machine, args: &RunArgs) -> ExitCode {
    let mut reporter = StderrReporter { quiet: args.quiet };
    let mut cycles: u64 = 0;

    loop {
        if args.step {
            print!("{}", inspect::render_machine(machine));
            pause_for_enter();
        }

        if let RunState::Halted(reason) = machine.step(&mut reporter) {
            return report_halt(reason);
        }

        cycles += 1;
        if args.max_cycles.is_some_and(|limit| cycles >= limit) {
            println!("cycle limit of {cycles} reached");
            return ExitCode::SUCCESS;
        }
    }
}

fn run(args: &RunArgs) -> ExitCode {
    match load_machine(args) {
        Ok(mut machine) => execute(&mut machine, args),
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let mut args = env::args_os();
    let _ = args.next();

    match parse_args(args) {
        Ok(ParseResult::Help) => {
            print!("{USAGE_TEXT}");
            ExitCode::SUCCESS
        }
        Ok(ParseResult::Args(run_args)) => run(&run_args),
        Err(message) => {
            eprintln!("error: {message}");
            eprint!("{USAGE_TEXT}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    use mic1_core::{
        load_control_store, load_program, HaltReason, Machine, MachineConfig, NullTrace,
    };

    use super::{parse_args, ParseResult, RunArgs, DEFAULT_MICROPROGRAM};

    fn args(list: &[&str]) -> impl Iterator<Item = OsString> {
        list.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn program_argument_with_defaults() {
        let parsed = parse_args(args(&["prog.bin"])).expect("parses");
        assert_eq!(
            parsed,
            ParseResult::Args(RunArgs {
                program: PathBuf::from("prog.bin"),
                microprogram: PathBuf::from(DEFAULT_MICROPROGRAM),
                step: false,
                quiet: false,
                max_cycles: None,
            })
        );
    }

    #[test]
    fn all_options_are_recognized() {
        let parsed = parse_args(args(&[
            "-s",
            "--quiet",
            "-m",
            "rom.bin",
            "--max-cycles",
            "250",
            "prog.bin",
        ]))
        .expect("parses");
        assert_eq!(
            parsed,
            ParseResult::Args(RunArgs {
                program: PathBuf::from("prog.bin"),
                microprogram: PathBuf::from("rom.bin"),
                step: true,
                quiet: true,
                max_cycles: Some(250),
            })
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse_args(args(&["--help"])).expect("parses"), ParseResult::Help);
        assert_eq!(
            parse_args(args(&["prog.bin", "-h"])).expect("parses"),
            ParseResult::Help
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--step"])).is_err());
    }

    #[test]
    fn bad_option_and_bad_count_are_errors() {
        assert!(parse_args(args(&["--bogus", "prog.bin"])).is_err());
        assert!(parse_args(args(&["--max-cycles", "many", "prog.bin"])).is_err());
        assert!(parse_args(args(&["a.bin", "b.bin"])).is_err());
    }

    #[test]
    fn images_written_to_disk_load_and_halt_normally() {
        let dir = tempfile::tempdir().expect("temp dir");

        // Slot 0 fetches the byte at PC; the init block starts with the
        // halt sentinel.
        let rom = dir.path().join("microprog.rom");
        fs::write(&rom, 0x0000_0000_0000_0010_u64.to_le_bytes()).expect("rom written");

        let prog = dir.path().join("prog.bin");
        let mut image = 20_u32.to_le_bytes().to_vec();
        image.push(0xFF);
        image.extend_from_slice(&[0; 19]);
        fs::write(&prog, image).expect("program written");

        let mut machine = Machine::with_config(&MachineConfig::default());
        let rom_bytes = fs::read(&rom).expect("rom readable");
        let report = load_control_store(&mut Cursor::new(rom_bytes), machine.control_store_mut())
            .expect("control store loads");
        assert_eq!(report.words_read, 1);

        let prog_bytes = fs::read(&prog).expect("program readable");
        let report = load_program(&mut Cursor::new(prog_bytes), machine.memory_mut())
            .expect("program loads");
        assert_eq!(report.declared_size, 20);

        assert_eq!(machine.run(&mut NullTrace), HaltReason::HaltInstruction);
    }
}
