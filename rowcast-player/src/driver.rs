//! Runs a carousel against a headless surface, frame by frame.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rowcast_core::{
    CarouselDeps, CarouselEvent, CarouselKey, CarouselTuning, CarouselView,
    CategoryLayoutModel, ContentIndex, HeadlessSurface, ImageFetcher,
    KeyResponse, NavDiagnostics,
};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;

/// Simulated frame interval.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub struct Driver {
    view: CarouselView,
    events: UnboundedReceiver<CarouselEvent>,
    surface: Arc<HeadlessSurface>,
    diagnostics: Arc<NavDiagnostics>,
    fetch_wait: Duration,
}

impl Driver {
    pub fn new(
        runtime: &Runtime,
        tuning: CarouselTuning,
        fetcher: Arc<dyn ImageFetcher>,
        fetch_wait: Duration,
    ) -> Self {
        let surface = Arc::new(HeadlessSurface::new());
        let diagnostics = Arc::new(NavDiagnostics::new());
        diagnostics.init();
        let (view, events) = CarouselView::new(
            tuning,
            CarouselDeps {
                surface: surface.clone(),
                fetcher,
                runtime: runtime.handle().clone(),
                diagnostics: diagnostics.clone(),
            },
        );
        Self {
            view,
            events,
            surface,
            diagnostics,
            fetch_wait,
        }
    }

    pub fn load(
        &mut self,
        width: f32,
        height: f32,
        content: ContentIndex,
        layout: CategoryLayoutModel,
    ) {
        self.view.set_viewport(width, height);
        self.view.set_content(content, layout);
    }

    /// Feed `keys` one at a time, letting each animation finish and each
    /// visible image arrive before the next key.
    pub fn play(
        &mut self,
        runtime: &Runtime,
        keys: &[CarouselKey],
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        self.settle(runtime);
        self.flush_events(out)?;

        for &key in keys {
            if self.view.handle_key(key) == KeyResponse::Ignored {
                log::info!("{key:?} ignored by the carousel");
            }
            self.settle(runtime);
            self.flush_events(out)?;
        }
        Ok(())
    }

    /// Run frames until no animation is active, then wait for in-flight
    /// fetches up to the configured limit.
    fn settle(&mut self, runtime: &Runtime) {
        let mut clock = Instant::now();
        while self.view.is_animating() {
            clock += FRAME;
            self.view.tick(clock);
            self.view.pump_completions();
            self.render();
        }

        let deadline = Instant::now() + self.fetch_wait;
        while self.view.stats().pending_fetches > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!(
                    "{} image fetches still pending after {:?}",
                    self.view.stats().pending_fetches,
                    self.fetch_wait
                );
                break;
            }
            let view = &mut self.view;
            let arrived = runtime
                .block_on(async { tokio::time::timeout(remaining, view.next_completion()).await });
            if !matches!(arrived, Ok(true)) {
                break;
            }
        }
        self.render();
    }

    /// Build a frame, then apply deferred node releases as a renderer
    /// would after presenting it.
    fn render(&mut self) {
        let frame = self.view.build_frame();
        log::trace!("frame: {} tiles, {} titles", frame.tiles.len(), frame.titles.len());
        self.surface.sync();
    }

    fn flush_events(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
        Ok(())
    }

    /// Tear the carousel down and report what the surface saw.
    pub fn finish(mut self) {
        let stats = self.view.stats();
        self.view.teardown();
        let released = self.surface.sync();
        self.diagnostics.shutdown();
        log::info!(
            "done: {} textures cached ({} placeholders), {} nodes released at teardown, surface {:?}",
            stats.cache.textures,
            stats.cache.placeholders,
            released,
            self.surface.stats()
        );
    }
}
