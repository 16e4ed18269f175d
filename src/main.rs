//! discorder - terminal chat client
//!
//! Drives the UI core from a real terminal. There is no network backend:
//! the server and channel lists are a small built-in directory, and sent
//! messages are echoed into the local history.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::event;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use discorder::app::{App, AppEvent, MenuPurpose};
use discorder::config::Config;
use discorder::history::{ContextLabel, DisplayEntry};
use discorder::paths;
use discorder::terminal::TerminalSession;
use discorder::ui::input::{InputEvent, KeyEvent};
use discorder::ui::menu::MenuItem;

/// Built-in directory: (server, description, channels)
const DIRECTORY: &[(&str, &str, &[&str])] = &[
    (
        "Rustaceans",
        "Systems programming, borrow checker support group",
        &["general", "beginners", "async", "off_topic"],
    ),
    (
        "Terminal Enthusiasts",
        "Everything that happens inside 80x24",
        &["general", "crossterm", "ncurses", "screenshots"],
    ),
    (
        "Home Lab",
        "Racks, cables and uptime",
        &["general", "networking", "storage"],
    ),
];

fn init_logging(config: &Config) -> Result<()> {
    let log_path = paths::log_path();
    paths::ensure_parent(&log_path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(config.log_filter.as_deref().unwrap_or("discorder=info"))
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn server_items() -> Vec<MenuItem<String>> {
    DIRECTORY
        .iter()
        .map(|(name, about, channels)| {
            MenuItem::new(
                *name,
                format!("{about} ({} channels)", channels.len()),
                name.to_string(),
            )
        })
        .collect()
}

fn channel_items(server: &str) -> Vec<MenuItem<String>> {
    DIRECTORY
        .iter()
        .filter(|(name, _, _)| *name == server)
        .flat_map(|(_, _, channels)| channels.iter())
        .map(|channel| {
            MenuItem::new(
                format!("#{channel}"),
                format!("Text channel on {server}"),
                channel.to_string(),
            )
        })
        .collect()
}

fn open_channel_menu(app: &mut App) -> Result<()> {
    let Some(server) = app.server().map(str::to_string) else {
        app.log("Select a server first with Ctrl+S");
        return Ok(());
    };
    app.open_menu(
        MenuPurpose::SelectChannel,
        &format!("Channels on {server}"),
        channel_items(&server),
    )
}

/// Returns false once the app asked to quit
fn dispatch(app: &mut App, outcome: AppEvent, author: &str) -> Result<bool> {
    match outcome {
        AppEvent::None => {}
        AppEvent::Quit => return Ok(false),
        AppEvent::Send { channel, text } => {
            app.push_entry(DisplayEntry::chat(
                author,
                ContextLabel::Channel(channel),
                text,
            ));
        }
        AppEvent::Picked {
            purpose,
            payload,
            marked,
        } => {
            if !marked.is_empty() {
                app.log(format!("Marked: {}", marked.join(", ")));
            }
            match purpose {
                MenuPurpose::SelectServer => {
                    app.set_server(Some(payload));
                    open_channel_menu(app)?;
                }
                MenuPurpose::SelectChannel => app.set_channel(Some(payload)),
            }
        }
        AppEvent::Unhandled(KeyEvent::Ctrl('s')) => {
            app.open_menu(MenuPurpose::SelectServer, "Servers", server_items())?;
        }
        AppEvent::Unhandled(KeyEvent::Ctrl('h')) => open_channel_menu(app)?,
        AppEvent::Unhandled(key) => debug!(?key, "unbound key"),
    }
    Ok(true)
}

fn run(config: Config) -> Result<()> {
    let author = std::env::var("USER").unwrap_or_else(|_| "me".to_string());

    let mut session = TerminalSession::enter()?;
    let (cols, rows) = TerminalSession::size()?;
    let mut app = App::new(config, cols, rows)?;
    app.log("Welcome! Ctrl+S picks a server, Ctrl+C quits");

    loop {
        let cursor = app.refresh()?;
        session.draw(app.buffer(), cursor)?;

        let raw = event::read().context("failed to read terminal event")?;
        let Some(input) = InputEvent::from_crossterm(&raw) else {
            continue;
        };
        let outcome = app.handle_event(&input)?;
        if !dispatch(&mut app, outcome, &author)? {
            break;
        }
    }

    info!("shutting down");
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::load(paths::config_path())?;
    init_logging(&config)?;
    info!(version = discorder::app::VERSION, "starting discorder");

    run(config)
}
