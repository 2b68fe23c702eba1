//! Command-line front end: solve a problem described in a TOML file.
//!
//! ```text
//! rootsolve <problem.toml> [--csv <out.csv>] [--log <off|error|warn|info|debug|trace>]
//! ```

use std::fs::{self, File};
use std::process::ExitCode;

use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rootsolve::{IterationStep, RootError, RootProblem, SolverConfig, SolverResult};

const USAGE: &str =
    "usage: rootsolve <problem.toml> [--csv <out.csv>] [--log <off|error|warn|info|debug|trace>]";

struct Args {
    problem: String,
    csv: Option<String>,
    log_level: LevelFilter,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut problem = None;
    let mut csv = None;
    let mut log_level = LevelFilter::Info;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--csv" => csv = Some(args.next().ok_or("--csv needs a file name")?),
            "--log" => {
                let level = args.next().ok_or("--log needs a level")?;
                log_level = level
                    .parse()
                    .map_err(|_| format!("unknown log level '{level}'"))?;
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if problem.is_none() => problem = Some(arg),
            _ => return Err(format!("unexpected argument '{arg}'\n{USAGE}")),
        }
    }

    Ok(Args {
        problem: problem.ok_or(USAGE)?,
        csv,
        log_level,
    })
}

fn load_config(path: &str) -> Result<SolverConfig, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}"))?;
    toml::from_str(&text).map_err(|err| format!("invalid problem file {path}: {err}"))
}

fn print_trace(result: &SolverResult) {
    for step in result.trace.steps() {
        match step {
            IterationStep::Bisection(s) => println!(
                "{:>4}  a = {:>12.4}  b = {:>12.4}  c = {:>14.6}  error = {:.2e}",
                s.index, s.a, s.b, s.c, s.error
            ),
            IterationStep::Newton(s) => println!(
                "{:>4}  x_old = {:>12.5}  f(x) = {:>10.2e}  x_new = {:>14.6}  error = {:.2e}",
                s.index, s.x_old, s.fx, s.x_new, s.error
            ),
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let config = load_config(&args.problem)?;
    let problem = RootProblem::new(&config).map_err(|err| err.to_string())?;

    let result = match problem.solve() {
        Ok(result) => result,
        Err(err) => {
            if let Some(trace) = err.partial_trace() {
                info!("{} steps completed before the failure", trace.len());
            }
            return Err(describe(&err));
        }
    };

    print_trace(&result);
    if result.converged {
        println!("root = {:.7}", result.root);
    } else {
        println!(
            "no convergence after {} iterations; last estimate {:.7}",
            result.iterations(),
            result.root
        );
    }

    if let Some(path) = &args.csv {
        let file = File::create(path).map_err(|err| format!("cannot create {path}: {err}"))?;
        result
            .trace
            .write_csv(file)
            .map_err(|err| err.to_string())?;
        info!("trace written to {path}");
    }
    Ok(())
}

fn describe(err: &RootError) -> String {
    match err {
        RootError::Bracketing { .. } => {
            format!("{err}; choose an interval where the function changes sign")
        }
        RootError::StationaryDerivative { .. } => {
            format!("{err}; try another initial guess")
        }
        _ => err.to_string(),
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    if args.log_level != LevelFilter::Off {
        // a second logger cannot be installed; keep running without one
        let _ = TermLogger::init(
            args.log_level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        );
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
