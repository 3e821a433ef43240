use anyhow::Result;
use sourcedeck::config::Config;
use sourcedeck::constants::ERROR_NO_API_TOKEN;
use sourcedeck::logger::Logger;
use sourcedeck::ui;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--generate-config") {
        let path = Config::get_default_config_path()?;
        Config::generate_default_config(&path)?;
        return Ok(());
    }

    let config = Config::load()?;
    let logger = Logger::from_config(&config.logging)?;

    // Check if API token is set
    let token = match std::env::var(&config.api.token_env) {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            eprintln!("{} ({})", ERROR_NO_API_TOKEN, config.api.token_env);
            eprintln!("\n💡 To use this app:");
            eprintln!("1. Create an API token in your profile page on {}", config.api.base_url);
            eprintln!("2. Set it as environment variable: export {}=your_token_here", config.api.token_env);
            eprintln!("3. Run the app again to browse your sources!");
            return Ok(());
        }
    };

    log::info!("Starting sourcedeck against {}", config.api.base_url);

    // Run the TUI application
    ui::run_app(config, logger, Some(token)).await?;

    Ok(())
}
