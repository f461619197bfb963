use anyhow::Result;
use context_cli::config::SettingsStore;
use context_cli::logging;
use context_cli::tui_app::TuiApp;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

fn print_help() {
    println!("context-cli - terminal panel for the Local Context DB server");
    println!();
    println!("Usage:");
    println!("  context-cli [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --server <url>      Use this server address for the session");
    println!("  --generate-config   Write a default config file and exit");
    println!("  --help              Show this help");
    println!("  --version           Show the version");
    println!();
    println!("Keys:");
    println!("  Tab          Switch between Add and Search tabs");
    println!("  Enter        Search / save captured text / create source");
    println!("  Space        Toggle a result for the composed context");
    println!("  a / c        Select all results / clear the selection");
    println!("  y / e        Copy composed context / export it to a file");
    println!("  d            Delete the highlighted source (with confirmation)");
    println!("  i            Show stats for the highlighted source");
    println!("  m            Minimize / restore the panel");
    println!("  Esc          Close the panel");
    println!();
    println!("Paste text into the terminal to capture it for the Add tab.");
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut server_override: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("context-cli {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--generate-config" => {
                let path = SettingsStore::generate_default_file()?;
                println!("Wrote default config to {}", path.display());
                return Ok(());
            }
            "--server" => match args.next() {
                Some(url) => server_override = Some(url),
                None => {
                    eprintln!("--server requires a URL argument");
                    std::process::exit(1);
                }
            },
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Try --help");
                std::process::exit(1);
            }
        }
    }

    logging::init();

    let mut settings = SettingsStore::load();
    if let Some(url) = server_override {
        // Session-only: a --server flag never overwrites the config file.
        settings.override_session(|s| s.server.base_url = url);
    }

    let runtime = tokio::runtime::Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(settings, runtime.handle().clone());
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}
