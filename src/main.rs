use anyhow::Result;
use content_hydrator::{
    Config, ContentRepository, ContentSource, DirectoryContentSource, FileSessionStore,
    HeadlessViewport, HttpContentSource, LanguageCoordinator, LanguagePreference, Page,
    PageEvent, PageOutline, SwitchOutcome,
};
use tracing::{info, warn};

const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 800.0;
const SECTION_HEIGHT: f64 = 900.0;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_hydrator=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let requested = std::env::args().nth(1);

    if config.is_remote() {
        info!("Loading content from {}", config.content_base);
        let source = HttpContentSource::new(
            &config.content_base,
            config.fetch_timeout(),
            config.retry_config(),
        )?;
        run(&config, source, requested).await
    } else {
        info!("Loading content from directory {}", config.content_base);
        run(
            &config,
            DirectoryContentSource::new(&config.content_base),
            requested,
        )
        .await
    }
}

/// Hydrate the standard page shell and print it as JSON.
async fn run<S: ContentSource>(config: &Config, source: S, requested: Option<String>) -> Result<()> {
    let mut outline = PageOutline::new();
    for id in ["hero", "pillars", "story", "chapters", "cta"] {
        outline.add_section(Some(id), true);
    }
    let viewport = HeadlessViewport::stacked(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, &outline, SECTION_HEIGHT);

    let coordinator = LanguageCoordinator::new(
        ContentRepository::new(source),
        LanguagePreference::with_key(
            FileSessionStore::new(&config.session_file),
            config.preference_key.clone(),
        ),
        viewport,
        outline,
        Page::standard(),
        config.hydration_settings(),
    );

    let mut outcome = coordinator.start().await;
    if let Some(code) = requested {
        if let Some(switched) = coordinator
            .handle_event(PageEvent::LanguageButton(code))
            .await
        {
            outcome = switched;
        }
    }
    coordinator.handle_event(PageEvent::Load).await;

    match outcome {
        SwitchOutcome::Rendered(lang) => info!("Page hydrated in {}", lang.native_name()),
        SwitchOutcome::Failed(lang) => warn!("No content could be loaded for {}", lang),
        SwitchOutcome::Superseded => {}
    }
    info!("Content metrics: {:?}", coordinator.repository().metrics().report());

    println!("{}", serde_json::to_string_pretty(&coordinator.snapshot())?);
    coordinator.shutdown();
    Ok(())
}
