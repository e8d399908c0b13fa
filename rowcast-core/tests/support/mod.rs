#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rowcast_core::{
    CarouselDeps, CarouselError, CarouselEvent, CarouselTuning, CarouselView,
    ContentIndex, HeadlessSurface, ImageFetcher, NavDiagnostics, Result,
};
use rowcast_model::Item;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

/// Source that resolves straight to a placeholder without I/O.
pub const NO_IMAGE: &str = "none:poster";

/// What a [`ScriptedFetcher`] answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A small valid PNG.
    Image,
    Bytes(Vec<u8>),
    Status(u16),
    /// Never resolves.
    Hang,
}

#[derive(Debug)]
pub struct ScriptedFetcher {
    reply: Reply,
    calls: Mutex<Vec<Url>>,
}

impl ScriptedFetcher {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.calls.lock().push(url.clone());
        match &self.reply {
            Reply::Image => Ok(png_bytes()),
            Reply::Bytes(bytes) => Ok(bytes.clone()),
            Reply::Status(status) => Err(CarouselError::HttpStatus {
                status: *status,
                url: url.to_string(),
            }),
            Reply::Hang => std::future::pending::<Result<Vec<u8>>>().await,
        }
    }
}

pub fn png_bytes() -> Vec<u8> {
    let poster = image::RgbaImage::from_pixel(8, 12, image::Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(poster)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Content with `rows` in order, every item using `source(index)`.
pub fn content(rows: &[(&str, usize)], source: impl Fn(usize) -> String) -> ContentIndex {
    let mut items = Vec::new();
    for (category, count) in rows {
        for _ in 0..*count {
            let index = items.len();
            items.push(Item::new(
                index,
                *category,
                format!("{category} {index}"),
                source(index),
            ));
        }
    }
    ContentIndex::new(items, rows.iter().map(|(c, _)| c.to_string()).collect())
}

pub fn offline_content(rows: &[(&str, usize)]) -> ContentIndex {
    content(rows, |_| NO_IMAGE.to_string())
}

pub fn remote_content(rows: &[(&str, usize)]) -> ContentIndex {
    content(rows, |i| format!("https://img.test/posters/{i}.png"))
}

pub struct Harness {
    pub view: CarouselView,
    pub events: UnboundedReceiver<CarouselEvent>,
    pub surface: Arc<HeadlessSurface>,
    pub diagnostics: Arc<NavDiagnostics>,
}

impl Harness {
    /// Must be called from inside a tokio runtime.
    pub fn new(tuning: CarouselTuning, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let surface = Arc::new(HeadlessSurface::new());
        let diagnostics = Arc::new(NavDiagnostics::new());
        diagnostics.init();
        let (view, events) = CarouselView::new(
            tuning,
            CarouselDeps {
                surface: surface.clone(),
                fetcher,
                runtime: Handle::current(),
                diagnostics: diagnostics.clone(),
            },
        );
        Self {
            view,
            events,
            surface,
            diagnostics,
        }
    }

    pub fn offline() -> Self {
        Self::new(CarouselTuning::default(), ScriptedFetcher::new(Reply::Hang))
    }

    pub fn drain_events(&mut self) -> Vec<CarouselEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}
