use recall::config::Config;
use recall::error::ShellError;
use recall::flags::Flags;
use recall::logging;
use recall::shell::{Exit, Shell};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("recall: {}", e);
            if matches!(e, ShellError::Flag(_) | ShellError::Config(_)) {
                eprintln!("Usage: {}", Flags::usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if flags.is_set("version") {
        println!("recall {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::from_flags(&flags)?;
    logging::init_tracing(config.debug);
    tracing::debug!(?config, interactive = config.is_interactive(), "starting");

    // The shell is dropped before returning, in the parent and in a child
    // whose exec failed alike.
    let mut shell = Shell::new(&config)?;
    match shell.run()? {
        Exit::Quit => Ok(ExitCode::SUCCESS),
        Exit::ChildExecFailed => Ok(ExitCode::FAILURE),
    }
}
