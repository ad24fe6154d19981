use anyhow::Result;
use tui_ideas_app::config::AppConfig;
use tui_ideas_app::internal::ui::app::App;
use tui_ideas_app::tui;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first to get logging settings
    let config = AppConfig::load();

    // An optional first argument seeds the initial location, exactly like
    // opening the page with a query string: `tui-ideas-app '?page=3&pageSize=20'`
    let initial_search = std::env::args().nth(1);

    // Try to initialize the terminal first so we can decide where tracing should write.
    // When the TUI is running we must avoid writing logs to stderr/stdout (which would
    // corrupt the UI). In that case we write logs to a rotating file. If TUI init fails
    // we enable console logging so messages are visible to the user.
    match tui::init() {
        Ok(terminal) => {
            // Running TUI: log to a daily rotating file.
            let log_dir = config.logging.log_directory.as_deref().unwrap_or("logs");
            let file_appender = tracing_appender::rolling::daily(log_dir, "tui-ideas-app.log");
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

            // RUST_LOG takes precedence over the configured level.
            let env_filter = match std::env::var("RUST_LOG") {
                Ok(_) => tracing_subscriber::EnvFilter::from_default_env(),
                Err(_) => tracing_subscriber::EnvFilter::new(config.logging.level.clone()),
            };

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact()
                .init();

            let res = match App::new(initial_search) {
                Ok(mut app) => app.run(terminal).await,
                Err(e) => Err(e),
            };

            // Restore terminal state before exiting so the console is usable again.
            tui::restore()?;

            if let Err(err) = res {
                // Print a short error to stderr as well so it's visible if someone runs the
                // binary directly; detailed traces will be available in the log file.
                eprintln!("{err:?}");
            }

            Ok(())
        }
        Err(e) => {
            // Failed to initialize TUI: enable console logging so messages are visible.
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .init();

            eprintln!("Failed to initialize TUI: {e:?}");
            Err(e)
        }
    }
}
