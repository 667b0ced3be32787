// glpipes: terminal browser for GitLab groups, projects, pipelines, jobs, and job logs.

mod app;
mod config;
mod error;
mod gitlab;
mod logging;
mod state;
mod ui;

use std::io;
use std::process::ExitCode;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::prelude::*;

use crate::app::App;
use crate::config::Config;
use crate::gitlab::GitLabClient;
use crate::state::Navigator;

#[tokio::main]
async fn main() -> ExitCode {
    // Configuration problems are reported before the terminal is taken over
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("glpipes: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = logging::init() {
        info!("Logging to {}", path.display());
    }
    info!("Using GitLab instance {}", config.base_url);

    let client = match GitLabClient::new(&config) {
        Ok(client) => client,
        Err(e) if e.is_config() => {
            eprintln!("glpipes: {}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("Client setup failed: {}", e);
            eprintln!("glpipes: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(client, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terminal error: {}", e);
            eprintln!("glpipes: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(client: GitLabClient, config: &Config) -> io::Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(Navigator::new(client), config.base_url.clone());
    let result = app.run(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
