use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tmrun::{analyze, Halted, Machine, MachineError, ProgramLoader, ProgramSpec};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tmrun busy-beaver      # runs ./busy-beaver.tm.json")]
struct Cli {
    /// Base name of the program; `<NAME>.tm.json` is read from the working directory
    name: String,

    /// Stop with an error after this many steps without halting
    #[clap(short, long)]
    max_steps: Option<u64>,

    /// Only print the final configuration and step count
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    ExitCode::from(report(run(&cli), &mut io::stdout()))
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

/// Prints the failure of a run, if any, and maps it to the process exit status.
fn report<W: Write>(result: Result<Halted>, out: &mut W) -> u8 {
    let Err(e) = result else {
        return EXIT_SUCCESS;
    };

    // Nothing more can be reported if stdout itself is gone.
    let _ = writeln!(out, "{e:#}");
    if let Some(MachineError::ConfigRead { .. }) = e.downcast_ref::<MachineError>() {
        let _ = writeln!(
            out,
            "Notice that turing machine program file names have to end with .tm.json"
        );
        let _ = writeln!(out, "But you don't have to include .tm.json in the argument");
    }

    EXIT_FAILURE
}

fn run(cli: &Cli) -> Result<Halted> {
    let path = ProgramLoader::program_path(&cli.name);
    let program = ProgramLoader::load_by_name(&cli.name)?;

    for diagnostic in analyze(&program) {
        warn!(program = %path.display(), "{diagnostic}");
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\nTURING MACHINE\nProgram: {}\n", path.display())?;

    let halted = execute(program, cli.max_steps, cli.quiet, &mut stdout)
        .with_context(|| format!("failed to run {}", path.display()))?;

    info!(steps = halted.steps, "run complete");
    Ok(halted)
}

/// Runs `program` and writes its trace followed by the halt summary to `out`.
fn execute<W: Write>(
    program: ProgramSpec,
    max_steps: Option<u64>,
    quiet: bool,
    out: &mut W,
) -> Result<Halted> {
    let mut machine = Machine::new(program);

    let halted = machine.try_run(max_steps, |snapshot| -> Result<()> {
        if !quiet {
            writeln!(out, "{snapshot}\n")?;
        }
        Ok(())
    })?;

    writeln!(out, "{halted}")?;
    Ok(halted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn program(rules: &str) -> ProgramSpec {
        ProgramLoader::load_program_from_string(&format!(
            r#"{{"tape": "101", "initialState": "A", "haltState": "H", "rules": [{rules}]}}"#
        ))
        .unwrap()
    }

    const HALT_RULE: &str =
        r#"{"currentState": "A", "tapeSymbol": "1", "nextState": "H", "writeSymbol": "1", "move": "R"}"#;

    #[test]
    fn test_execute_prints_trace_and_summary() {
        let mut out = Vec::new();

        let halted = execute(program(HALT_RULE), None, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(halted.steps, 1);
        assert_eq!(
            text,
            "1 0 1\n  ^ A\n\nThe turing machine has halted\nFinal tape config is:\n1 0 1\n    ^ H\nsteps=1\n"
        );
    }

    #[test]
    fn test_execute_quiet() {
        let mut out = Vec::new();

        execute(program(HALT_RULE), None, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("The turing machine has halted"));
    }

    #[test]
    fn test_execute_reports_run_errors() {
        let mut out = Vec::new();

        let error = execute(program(""), None, false, &mut out).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<MachineError>(),
            Some(MachineError::NoMatchingRule { .. })
        ));
    }

    #[test]
    fn test_execute_step_limit() {
        let looping = r#"{"currentState": "A", "tapeSymbol": "1", "nextState": "A", "writeSymbol": "1", "move": "L"},
            {"currentState": "A", "tapeSymbol": "0", "nextState": "A", "writeSymbol": "0", "move": "R"}"#;
        let mut out = Vec::new();

        let error = execute(program(looping), Some(10), true, &mut out).unwrap_err();

        assert_eq!(
            error.downcast_ref::<MachineError>(),
            Some(&MachineError::StepLimitExceeded(10))
        );
    }

    #[test]
    fn test_execute_stops_on_write_failure() {
        let looping = r#"{"currentState": "A", "tapeSymbol": "1", "nextState": "A", "writeSymbol": "1", "move": "L"},
            {"currentState": "A", "tapeSymbol": "0", "nextState": "A", "writeSymbol": "0", "move": "R"}"#;

        let error = execute(program(looping), None, false, &mut ClosedPipe).unwrap_err();

        assert_eq!(
            error.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::BrokenPipe)
        );
    }

    #[test]
    fn test_execute_head_far_past_tape() {
        let spec = ProgramLoader::load_program_from_string(
            r#"{"tape": "10", "initialState": "A", "haltState": "H", "rules": [],
                "headPosition": 9223372036854775807}"#,
        )
        .unwrap();
        let mut out = Vec::new();

        let error = execute(spec, None, false, &mut out).unwrap_err();

        assert_eq!(
            error.downcast_ref::<MachineError>(),
            Some(&MachineError::TapeBoundsExceeded {
                head: i64::MAX,
                len: 2,
            })
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1 0\n    > A (head 9223372036854775807)\n\n"
        );
    }

    #[test]
    fn test_report_success() {
        let mut out = Vec::new();
        let halted = execute(program(HALT_RULE), None, true, &mut Vec::new());

        assert_eq!(report(halted, &mut out), EXIT_SUCCESS);
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_missing_file_prints_hint() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("missing");
        let cli = Cli::parse_from(["tmrun", base.to_str().unwrap()]);
        let mut out = Vec::new();

        let code = report(run(&cli), &mut out);
        let text = String::from_utf8(out).unwrap();

        assert_eq!(code, EXIT_FAILURE);
        assert!(text.contains("missing.tm.json"));
        assert!(text.contains("have to end with .tm.json"));
    }

    #[test]
    fn test_report_parse_error_has_no_hint() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.tm.json"), "{ not json").unwrap();
        let base = dir.path().join("broken");
        let cli = Cli::parse_from(["tmrun", base.to_str().unwrap()]);
        let mut out = Vec::new();

        let code = report(run(&cli), &mut out);
        let text = String::from_utf8(out).unwrap();

        assert_eq!(code, EXIT_FAILURE);
        assert!(!text.is_empty());
        assert!(!text.contains(".tm.json"));
    }

    #[test]
    fn test_report_run_failure() {
        let mut out = Vec::new();
        let result = execute(program(""), None, true, &mut Vec::new());

        assert_eq!(report(result, &mut out), EXIT_FAILURE);
        assert!(String::from_utf8(out).unwrap().contains("no rule defined"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["tmrun", "busy-beaver", "--max-steps", "50", "-q"]);

        assert_eq!(cli.name, "busy-beaver");
        assert_eq!(cli.max_steps, Some(50));
        assert!(cli.quiet);
    }
}
