use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use feynmind_client::ApiClient;
use feynmind_config::{default_config_path, Config};
use feynmind_speech::{CommandRecognizer, Recognizer, SpeechCapture};

mod app;
mod ui;

use app::{App, Screen};

#[derive(Parser)]
#[command(name = "feynmind-tui")]
#[command(about = "Terminal client for the FeynMind learning backend")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "FEYNMIND_API_BASE")]
    server_url: Option<String>,

    /// Config file path
    #[arg(long, env = "FEYNMIND_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(default_config_path)
        .context("could not determine a config path")?;
    let config = Config::load(&config_path)
        .await
        .with_context(|| format!("loading config from {:?}", config_path))?;

    init_logging(&config);

    let base_url = cli.server_url.unwrap_or_else(|| config.api.base_url.clone());
    let client = ApiClient::new(base_url);

    // Capability detection happens exactly once, here.
    let recognizer = config
        .speech
        .command
        .as_deref()
        .and_then(|command| CommandRecognizer::detect(command, &config.speech.args))
        .map(|r| Box::new(r) as Box<dyn Recognizer>);
    let speech = SpeechCapture::new(recognizer);

    let mut app = App::new(client, speech);
    app.check_connection().await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    app.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let tick_rate = tokio::time::Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if crossterm::event::poll(tick_rate)? {
            if let Event::Key(key) = crossterm::event::read()? {
                if handle_key_event(app, key).await {
                    return Ok(());
                }
            }
        }

        // Drain speech and backend results once per tick.
        app.process_events();
    }
}

/// Returns true when the app should quit.
async fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    // Global bindings first.
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        KeyCode::Tab => {
            app.cycle_screen();
            return false;
        }
        _ => {}
    }

    match app.screen {
        Screen::Home => handle_home_key(app, key),
        Screen::Chat => handle_chat_key(app, key).await,
        Screen::Quiz => handle_quiz_key(app, key),
    }
    false
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.cycle_difficulty();
        }
        KeyCode::Enter => {
            app.confirm_topic();
        }
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_topic_char(c);
        }
        KeyCode::Backspace => {
            app.pop_topic_char();
        }
        _ => {}
    }
}

async fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_mic().await;
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.save_minutes();
        }
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_history();
        }
        KeyCode::F(n @ 1..=3) => {
            app.pick_followup(n as usize - 1);
        }
        KeyCode::Enter => {
            app.analyze();
        }
        KeyCode::Up => {
            app.scroll_up();
        }
        KeyCode::Down => {
            app.scroll_down();
        }
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_transcript_char(c);
        }
        KeyCode::Backspace => {
            app.pop_transcript_char();
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => {
            app.select_previous_question();
        }
        KeyCode::Down => {
            app.select_next_question();
        }
        KeyCode::Char(c @ '1'..='9') if key.modifiers.is_empty() => {
            // Out-of-range choices are ignored by the flow.
            app.choose(c as usize - '1' as usize);
        }
        KeyCode::Char('n') => {
            app.load_quiz();
        }
        KeyCode::Char('r') => {
            // Retry after a failed generation.
            app.load_quiz();
        }
        KeyCode::Enter => {
            app.submit_quiz();
        }
        _ => {}
    }
}
