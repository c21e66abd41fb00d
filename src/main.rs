use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser as _;
use tracing::{debug, info};

use recovery_shell::terminal::{CommandRes, SessionHooks, Terminal};

use crate::cli::Cli;

mod cli;

fn main() -> io::Result<()> {
    let cli_args = Cli::parse();
    setup_tracing(&cli_args);
    debug!("Parsed CLI arguments: {cli_args:?}");

    let exited = Arc::new(AtomicBool::new(false));
    let hooks = SessionHooks::new(|| info!("Reboot requested, session continues"), {
        let exited = exited.clone();
        move || exited.store(true, Ordering::SeqCst)
    });
    let mut terminal = Terminal::new((&cli_args).into(), hooks);

    let mut stdout = io::stdout();
    let prompt = terminal.config().prompt.clone();
    write!(stdout, "{prompt} ")?;
    stdout.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        match terminal.handle_command(&line) {
            // Host-side rendering of `clear`: wipe the screen
            CommandRes::Clear => write!(stdout, "\x1b[2J\x1b[H")?,
            res => {
                for output in res.lines() {
                    if res.is_error() {
                        eprintln!("{output}");
                    } else {
                        writeln!(stdout, "{output}")?;
                    }
                }
            }
        }
        if exited.load(Ordering::SeqCst) {
            break;
        }
        write!(stdout, "{prompt} ")?;
        stdout.flush()?;
    }

    if cli_args.dump {
        let json = terminal.tree().to_json().map_err(io::Error::other)?;
        writeln!(stdout, "{json}")?;
    }
    Ok(())
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(level) = cli_args.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .without_time()
            .compact()
            .init();
    }
}
