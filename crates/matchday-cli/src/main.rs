// matchday entry point.
//
// Startup sequence:
// 1. Load config (copying defaults on first run)
// 2. Initialize tracing (log to file, not terminal)
// 3. Open database and recover the league (or seed a new one)
// 4. Read commands from stdin until `quit` or EOF

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{error, info};

use matchday_cli::app::{self, AppState, Reply};
use matchday_cli::command::{parse_line, CommandError};
use matchday_core::config;
use matchday_core::db::Database;

fn main() -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;

    init_tracing(config.log_filter.as_deref())?;
    info!("matchday starting up: league={}", config.league.name);

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = config.db_path.to_string_lossy().into_owned();
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    let league = app::recover_from_db(&config, &db).context("failed to load league")?;
    let mut app_state = AppState::new(config, league, db);

    println!("{} (type `help` for commands)", app_state.config.league.name);
    print!("{}", matchday_cli::view::standings_table(&app_state.league.standings()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{}> ", app_state.session.role().label())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let cmd = match parse_line(&line) {
            Ok(cmd) => cmd,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match app_state.handle_command(cmd) {
            Reply::Output(text) => println!("{}", text.trim_end()),
            Reply::Quit => break,
        }
    }

    if let Err(e) = app_state.persist() {
        error!("Final save failed: {:#}", e);
    }
    info!("matchday shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the prompt).
fn init_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("matchday.log"))?;

    let default_filter = filter.unwrap_or("matchday=info,warn");
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
