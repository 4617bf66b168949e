use anyhow::{Context, Result, bail};
use flick_config::FlickConfig;
use flick_http::HttpClient;
use flick_search::{
    FetchedImage, GenerationTracker, ImageFetcher, IndexPicker, SEARCHING_MESSAGE, SearchMode,
    SearchPipeline, SearchSettings, SeededPicker, SelectedPhoto, ThreadRngPicker, TrackedOutcome,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::interactive::{HELP, Line, parse_line};

type Pipeline = SearchPipeline<HttpClient, Box<dyn IndexPicker>>;

/// Where results (`out`) and status lines (`status`) are written.
pub trait Console: Send + Sync + 'static {
    fn out(&self, line: &str);
    fn status(&self, line: &str);
}

/// Results on stdout, status on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdio;

impl Console for Stdio {
    fn out(&self, line: &str) {
        println!("{line}");
    }

    fn status(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// What to do with a found photo.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub save: Option<PathBuf>,
    pub fetch_image: bool,
    pub json: bool,
}

pub struct App<C = Stdio> {
    pipeline: Pipeline,
    fetcher: ImageFetcher,
    output: OutputOptions,
    console: C,
}

pub fn build_from_config(
    cfg: &FlickConfig,
    seed: Option<u64>,
    output: OutputOptions,
) -> Result<App> {
    build_with_console(cfg, seed, output, Stdio)
}

pub fn build_with_console<C: Console>(
    cfg: &FlickConfig,
    seed: Option<u64>,
    output: OutputOptions,
    console: C,
) -> Result<App<C>> {
    if !cfg.api.has_key() {
        bail!("no Flickr API key configured (set api.key or FLICK__API__KEY)");
    }

    let settings = SearchSettings::new(cfg.api.key.clone())
        .with_endpoint(&cfg.api.scheme, &cfg.api.host, &cfg.api.path)
        .with_context(|| {
            format!(
                "invalid search endpoint {}://{}{}",
                cfg.api.scheme, cfg.api.host, cfg.api.path
            )
        })?
        .with_safe_search(cfg.search.safe_search)
        .with_bbox_half_extents(cfg.search.bbox_half_width, cfg.search.bbox_half_height);

    let http = HttpClient::new(&format!("{}://{}", cfg.api.scheme, cfg.api.host))
        .context("building HTTP client")?
        .with_timeout(cfg.search.timeout());

    let picker: Box<dyn IndexPicker> = match seed {
        Some(seed) => Box::new(SeededPicker::new(seed)),
        None => Box::new(ThreadRngPicker),
    };
    tracing::debug!(?settings, seeded = seed.is_some(), "app.configured");

    Ok(App {
        pipeline: SearchPipeline::with_picker(settings, http.clone(), picker),
        fetcher: ImageFetcher::new(http),
        output,
        console,
    })
}

impl<C: Console> App<C> {
    /// Run one search and report it. Returns whether a photo was found.
    pub async fn search_once(&self, mode: SearchMode) -> bool {
        if let Err(err) = mode.validate() {
            tracing::info!(error = %err, "app.input.rejected");
            self.console.status(err.user_message());
            return false;
        }
        self.console.status(SEARCHING_MESSAGE);
        match self.pipeline.run(&mode).await {
            Ok(photo) => {
                let image = self.load_image(&photo).await;
                self.present(&photo, image.as_ref());
                true
            }
            Err(err) => {
                self.console.status(err.user_message());
                false
            }
        }
    }

    /// Searches run concurrently; only the newest one is reported.
    pub async fn interactive(self: Arc<Self>) -> Result<()> {
        let tracker = Arc::new(GenerationTracker::new());
        let mut tasks = JoinSet::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.console.status(HELP);

        while let Some(raw) = lines.next_line().await.context("reading stdin")? {
            let mode = match parse_line(&raw) {
                Line::Quit => break,
                Line::Blank => continue,
                Line::Help => {
                    self.console.status(HELP);
                    continue;
                }
                Line::Search(Err(err)) => {
                    tracing::info!(error = %err, "app.input.rejected");
                    self.console.status(err.user_message());
                    continue;
                }
                Line::Search(Ok(mode)) => mode,
            };

            self.console.status(SEARCHING_MESSAGE);
            let (app, tracker) = (self.clone(), tracker.clone());
            tasks.spawn(async move {
                let outcome = app.pipeline.run_tracked(&mode, &tracker).await;
                app.finish_tracked(outcome, &tracker).await;
            });
            while let Some(joined) = tasks.try_join_next() {
                if let Err(err) = joined {
                    tracing::warn!(error = %err, "app.search_task.failed");
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                tracing::warn!(error = %err, "app.search_task.failed");
            }
        }
        Ok(())
    }

    /// Report `outcome` unless a newer search has started. Returns whether anything was shown.
    async fn finish_tracked(&self, outcome: TrackedOutcome, tracker: &GenerationTracker) -> bool {
        let TrackedOutcome { ticket, result } = outcome;
        if !tracker.is_current(&ticket) {
            tracing::debug!(generation = ticket.generation, "app.result.discarded");
            return false;
        }
        match result {
            Ok(photo) => {
                let image = self.load_image(&photo).await;
                // The image download may have been overtaken as well.
                if !tracker.is_current(&ticket) {
                    tracing::debug!(generation = ticket.generation, "app.result.discarded");
                    return false;
                }
                self.present(&photo, image.as_ref());
            }
            Err(err) => self.console.status(err.user_message()),
        }
        true
    }

    async fn load_image(&self, photo: &SelectedPhoto) -> Option<(FetchedImage, Option<PathBuf>)> {
        if !self.output.fetch_image {
            return None;
        }
        let image = match self.fetcher.fetch(photo).await {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(url = %photo.image_url, error = %err, "app.image.failed");
                self.console.status(&format!("Could not load the image: {err}"));
                return None;
            }
        };
        let saved = match &self.output.save {
            Some(path) => match tokio::fs::write(path, &image.bytes).await {
                Ok(()) => Some(path.clone()),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "app.image.save_failed");
                    self.console.status(&format!(
                        "Could not save the image to {}: {err}",
                        path.display()
                    ));
                    None
                }
            },
            None => None,
        };
        Some((image, saved))
    }

    fn present(&self, photo: &SelectedPhoto, image: Option<&(FetchedImage, Option<PathBuf>)>) {
        if self.output.json {
            let image = image.map(|(img, saved)| {
                json!({
                    "format": img.extension(),
                    "width": img.width,
                    "height": img.height,
                    "bytes": img.bytes.len(),
                    "saved_to": saved.as_ref().map(|p| p.display().to_string()),
                })
            });
            let line = json!({
                "title": photo.title,
                "image_url": photo.image_url,
                "image": image,
            });
            self.console.out(&line.to_string());
            return;
        }

        self.console.out(&photo.title);
        self.console.out(&photo.image_url);
        if let Some((img, saved)) = image {
            self.console.out(&format!("{}x{} {}", img.width, img.height, img.extension()));
            if let Some(path) = saved {
                self.console.out(&format!("saved to {}", path.display()));
            }
        }
    }
}
