use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use netpulse_dash::input;
use netpulse_dash::ui::{self, format, Theme};
use netpulse_dash::{App, ConfigUpdate, ControlClient, Settings, ThresholdsUpdate, WebSocketTransport};

#[derive(Parser, Debug)]
#[command(name = "netpulse-dash")]
#[command(about = "Live terminal dashboard for the netpulse network probing daemon")]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Daemon origin, e.g. http://localhost:7331
    #[arg(short, long, global = true)]
    daemon_url: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "netpulse_dash=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Live dashboard (default)
    Watch {
        /// Print a grade line on every change instead of drawing the TUI
        #[arg(long)]
        headless: bool,
    },
    /// Check that the daemon is up
    Health,
    /// Show or change probe settings and thresholds
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List, add or remove probed targets
    Targets {
        #[command(subcommand)]
        action: TargetsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set {
        #[arg(long)]
        interval_ms: Option<u32>,
        #[arg(long)]
        timeout_ms: Option<u32>,
        #[arg(long)]
        loss_pct: Option<f64>,
        #[arg(long)]
        p95_ms: Option<f64>,
        #[arg(long)]
        jitter_ms: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum TargetsAction {
    List,
    Add {
        #[arg(long)]
        host: String,
        #[arg(long)]
        port: u16,
        #[arg(long)]
        label: String,
    },
    Remove {
        /// Target id as shown by `targets list`
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())
        .context("failed to load settings")?;
    if let Some(url) = cli.daemon_url {
        settings.daemon_url = url;
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    let command = cli.command.unwrap_or(Command::Watch { headless: false });
    let tui = matches!(command, Command::Watch { headless: false });
    init_logging(&settings, tui)?;

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    match command {
        Command::Watch { headless: false } => run_tui(&settings),
        Command::Watch { headless: true } => rt.block_on(run_headless(&settings)),
        Command::Health => rt.block_on(show_health(&settings)),
        Command::Config { action } => rt.block_on(run_config(&settings, action)),
        Command::Targets { action } => rt.block_on(run_targets(&settings, action)),
    }
}

/// The TUI owns the terminal, so it only logs to a file. Everything else
/// logs to stderr.
fn init_logging(settings: &Settings, tui: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    if let Some(path) = &settings.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn control_client(settings: &Settings) -> Result<ControlClient> {
    Ok(ControlClient::builder()
        .endpoint(settings.daemon_url.clone())
        .api_prefix(settings.api_prefix.clone())
        .timeout(settings.request_timeout())
        .build()?)
}

fn build_app(settings: &Settings) -> Result<App> {
    let transport = WebSocketTransport::new(
        &settings.daemon_url,
        &settings.stream_path,
        settings.reconnect_policy(),
    )?;
    let app = App::new(Box::new(transport), settings.stale_after_ms)
        .with_control(control_client(settings)?);
    Ok(app)
}

/// Run the TUI against the daemon stream
fn run_tui(settings: &Settings) -> Result<()> {
    let mut app = build_app(settings)?.with_theme(Theme::auto_detect());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.start();
    let result = run_app(&mut terminal, &mut app, settings.tick());
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    while app.running {
        app.pump();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = input::poll_event(tick)? {
            match event {
                Event::Key(key) => input::handle_key_event(app, key),
                Event::Mouse(mouse) => input::handle_mouse_event(app, mouse),
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

/// Stream without a terminal UI, printing one line per tick that changed
/// the store.
async fn run_headless(settings: &Settings) -> Result<()> {
    let mut app = build_app(settings)?;
    app.start();
    info!(source = app.source_description(), "headless watch");

    let mut ticker = tokio::time::interval(settings.tick());
    let mut last_revision = app.store.revision();
    let mut last_state = app.connection_state();
    let started = Instant::now();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                app.pump();
                let state = app.connection_state();
                if state != last_state {
                    eprintln!("[{:>6.1}s] stream {}", started.elapsed().as_secs_f64(), state);
                    last_state = state;
                }
                if app.store.revision() == last_revision || app.store.config().is_none() {
                    continue;
                }
                last_revision = app.store.revision();
                println!("{}", grade_line(&app));
            }
        }
    }

    app.shutdown();
    Ok(())
}

fn grade_line(app: &App) -> String {
    let health = app.store.health();
    let online = app.store.targets().iter().filter(|t| t.is_online()).count();
    format!(
        "{} grade {} | {} | {}/{} online | {} events",
        format::format_clock(format::now_ms()),
        health.grade,
        health.message,
        online,
        app.store.target_count(),
        app.store.events().len()
    )
}

async fn show_health(settings: &Settings) -> Result<()> {
    let health = control_client(settings)?.health().await?;
    println!(
        "{} ok={} uptime={}",
        settings.daemon_url,
        health.ok,
        format::format_uptime(health.uptime_s)
    );
    Ok(())
}

async fn run_config(settings: &Settings, action: ConfigAction) -> Result<()> {
    let client = control_client(settings)?;
    match action {
        ConfigAction::Show => {
            let daemon = client.get_config().await?;
            let config = &daemon.config;
            println!("probe_interval_ms: {}", config.probe_interval_ms);
            println!("probe_timeout_ms:  {}", config.probe_timeout_ms);
            match &config.thresholds {
                Some(t) => println!(
                    "thresholds:        loss {} · p95 {} · jitter {}",
                    format::format_pct(t.loss_pct),
                    format::format_ms(t.p95_ms),
                    format::format_ms(t.jitter_ms)
                ),
                None => println!("thresholds:        disabled"),
            }
            println!("targets:           {}", daemon.targets.len());
        }
        ConfigAction::Set {
            interval_ms,
            timeout_ms,
            loss_pct,
            p95_ms,
            jitter_ms,
        } => {
            let thresholds = ThresholdsUpdate {
                loss_pct,
                p95_ms,
                jitter_ms,
            };
            let update = ConfigUpdate {
                probe_interval_ms: interval_ms,
                probe_timeout_ms: timeout_ms,
                thresholds: (!thresholds.is_empty()).then_some(thresholds),
            };
            if update.is_empty() {
                anyhow::bail!("nothing to change; pass at least one setting");
            }
            client.update_config(&update).await?;
            println!("config updated");
        }
    }
    Ok(())
}

async fn run_targets(settings: &Settings, action: TargetsAction) -> Result<()> {
    let client = control_client(settings)?;
    match action {
        TargetsAction::List => {
            let daemon = client.get_config().await?;
            println!("{:<20} {:<24} {:<28}", "ID", "LABEL", "ADDRESS");
            for t in &daemon.targets {
                println!(
                    "{:<20} {:<24} {:<28}",
                    t.id,
                    t.label,
                    format!("{}:{}", t.host, t.port)
                );
            }
        }
        TargetsAction::Add { host, port, label } => {
            match client.add_target(&host, port, &label).await? {
                Some(id) => println!("added {} ({})", label, id),
                None => println!("added {}", label),
            }
        }
        TargetsAction::Remove { id } => {
            client.remove_target(&id).await?;
            println!("removed {}", id);
        }
    }
    Ok(())
}
