//! ifsc-ledger binary: look up an IFSC code and append the result to the CSV ledger.
//!
//! `ifsc-ledger [CODE]` resolves and records one code; `ifsc-ledger history`
//! prints what has been recorded so far.

mod logging;

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ifsc_ledger::{
    Config, LookupCode, RecordStore, ResolvedRecord, Resolver, resolve_and_record,
};

#[derive(Parser, Debug)]
#[command(name = "ifsc-ledger", version)]
#[command(about = "Resolve an IFSC code and append the result to a CSV ledger")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// IFSC code to look up; prompts (or uses the configured default) when omitted
    #[arg(value_name = "CODE")]
    code: Option<String>,

    /// CSV ledger to append to (default: IFSC_CODE.csv)
    #[arg(short, long, value_name = "PATH", global = true, env = "IFSC_LEDGER_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON configuration file (endpoints, retry policy, timeouts)
    #[arg(short, long, value_name = "PATH", global = true, env = "IFSC_LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Print records as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose: log endpoint tries and backoff on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every record in the ledger
    History,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("ifsc-ledger: cannot initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ifsc-ledger: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> ifsc_ledger::Result<()> {
    let config = load_config(&args)?;
    let store = RecordStore::new(&config.store.path);

    if let Some(Command::History) = args.cmd {
        for record in store.load()? {
            print_record(&record, args.json)?;
        }
        return Ok(());
    }

    let code = match code_argument(&args) {
        Some(code) => code,
        None => {
            let stdin = std::io::stdin();
            let interactive = stdin.is_terminal();
            read_code(stdin.lock(), std::io::stdout(), interactive, &config.default_code)?
        }
    };

    let resolver = Resolver::from_config(&config)?;
    let record = resolve_and_record(&resolver, &store, &code).await?;

    if args.json {
        print_record(&record, true)?;
    } else {
        println!("IFSC saved: {record}");
        if !record.is_resolved() {
            eprintln!("ifsc-ledger: no endpoint could resolve {code}; recorded as N/A");
        }
    }
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(args: &Args) -> ifsc_ledger::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(output) = &args.output {
        config.store.path = output.clone();
    }
    Ok(config)
}

/// Positional code with surrounding whitespace removed
fn code_argument(args: &Args) -> Option<LookupCode> {
    args.code.as_deref().map(|code| LookupCode::from(code.trim()))
}

/// Ask for a code when `interactive`; blank input or no terminal means `default`
fn read_code(
    mut input: impl BufRead,
    mut output: impl Write,
    interactive: bool,
    default: &str,
) -> ifsc_ledger::Result<LookupCode> {
    if !interactive {
        return Ok(LookupCode::from(default));
    }

    write!(output, "IFSC code [{default}]: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let typed = line.trim();
    Ok(LookupCode::from(if typed.is_empty() { default } else { typed }))
}

fn print_record(record: &ResolvedRecord, json: bool) -> ifsc_ledger::Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
    } else {
        println!("{record}");
    }
    Ok(())
}
