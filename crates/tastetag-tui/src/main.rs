use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tastetag_service::BlockingHttpService;

use tastetag_tui::app::App;

const DEFAULT_PORT: u16 = 3720;
const DEFAULT_URL: &str = "http://127.0.0.1:3720";
const DEFAULT_UPSTREAM_URL: &str = "https://ai-agent-hackathons.onrender.com";

#[derive(Debug, Parser)]
#[command(name = "tastetag", about = "Rate restaurant recommendations for an Instagram tag")]
struct Cli {
    /// Connect to a running tastetag-server instead of spawning one
    #[arg(long)]
    server: Option<String>,

    /// Base URL of the recommendation service's rewrite endpoint
    #[arg(long, env = "TASTETAG_REWRITE_URL", default_value = DEFAULT_UPSTREAM_URL)]
    rewrite_url: String,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long, env = "TASTETAG_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.log_file {
        init_logging(path)?;
    }

    // No --server: spawn tastetag-server locally, forwarding to the same
    // recommendation service the rewrite goes to.
    let (server_url, mut child) = match cli.server {
        Some(url) => (url, None),
        None => {
            let child = spawn_server(&cli.rewrite_url)?;
            (DEFAULT_URL.to_string(), Some(child))
        }
    };

    let service = BlockingHttpService::new(&server_url, &cli.rewrite_url)
        .context("failed to create tokio runtime")?;
    let result = wait_for_server(&service).and_then(|()| run_tui(service));

    // Cleanup: kill server if we spawned it
    if let Some(ref mut child) = child {
        let _ = child.kill();
        let _ = child.wait();
    }

    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn spawn_server(upstream_url: &str) -> Result<Child> {
    // Look for tastetag-server next to our own binary first,
    // then fall back to PATH
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.join("tastetag-server")))
        .filter(|p| p.exists());
    let server_bin: PathBuf = sibling.unwrap_or_else(|| "tastetag-server".into());

    let child = Command::new(&server_bin)
        .env("TASTETAG_BIND", "127.0.0.1")
        .env("TASTETAG_PORT", DEFAULT_PORT.to_string())
        .env("TASTETAG_UPSTREAM_URL", upstream_url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {}", server_bin.display()))?;

    Ok(child)
}

fn wait_for_server(service: &BlockingHttpService) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(10);

    loop {
        if service.health_check().is_ok() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            bail!(
                "tastetag-server at {} did not become ready within {}s",
                service.base_url(),
                timeout.as_secs()
            );
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn run_tui(service: BlockingHttpService) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: BlockingHttpService,
) -> Result<()> {
    let mut app = App::new(service);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        // A fetch or rewrite is due: take a pending key if there is one,
        // otherwise run the call now that its "in progress" frame is drawn.
        if app.needs_polling() {
            if event::poll(Duration::from_millis(20))? {
                if let Event::Key(key) = event::read()? {
                    if app.should_quit(key) {
                        break;
                    }
                    app.handle_key(key);
                }
            } else {
                app.tick();
            }
        } else if let Event::Key(key) = event::read()? {
            if app.should_quit(key) {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
