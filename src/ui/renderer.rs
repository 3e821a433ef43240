use crate::api::{HttpTransport, Transport};
use crate::config::Config;
use crate::logger::Logger;
use crate::ui::app_component::AppComponent;
use crate::ui::core::{Component, EventHandler, EventType};
use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::sync::Arc;

/// Run the TUI against the configured backend until the user quits
pub async fn run_app(config: Config, logger: Logger, token: Option<String>) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config.api.base_url, token)
        .with_context(|| format!("Failed to set up API client for {}", config.api.base_url))?;
    let transport: Arc<dyn Transport> = Arc::new(transport);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppComponent::new(&config, transport, logger);
    let mut event_handler = EventHandler::new();

    app.trigger_initial_load();

    let result = run_app_loop(&mut terminal, &mut app, &mut event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppComponent,
    event_handler: &mut EventHandler,
) -> anyhow::Result<()> {
    let mut needs_render = true;

    loop {
        if needs_render {
            terminal.draw(|f| app.render(f, f.area()))?;
            needs_render = false;
        }

        let event = event_handler.next_event().await?;
        match event {
            EventType::Key(_) | EventType::Resize(_, _) => {
                app.handle_event(event)?;
                needs_render = true;
            }
            EventType::Tick => {
                // Fold results from background requests; keep the spinner moving while busy
                let applied = app.process_background_events();
                needs_render = applied > 0 || app.active_task_count() > 0 || app.notice().is_some();
            }
            EventType::Other => {}
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
