//! Background indexing and composition.
//!
//! Each request runs on its own thread and reports [`Envelope`]s over a
//! channel. Starting a request supersedes any earlier one of the same kind;
//! receivers drop envelopes whose generation is no longer current.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use image::RgbaImage;
use rand::thread_rng;
use tracing::debug;

use crate::composer::{MosaicComposer, MosaicSpec, Tile};
use crate::error::{ComposeError, IndexError};
use crate::indexer::{ImageIndexer, IndexedLibrary};
use crate::palette::ColorIndex;

/// An event tagged with the request that produced it.
#[derive(Debug)]
pub struct Envelope<E> {
    /// Request the event belongs to.
    pub generation: u64,
    /// The event itself.
    pub event: E,
}

/// Events from an indexing run: progress values, then one terminal event.
#[derive(Debug)]
pub enum IndexEvent {
    /// Percentage of images handled so far.
    Progress(f32),
    /// The run finished with at least one usable image.
    Ready(IndexedLibrary),
    /// Nothing to index. Carries the error only when the directory itself
    /// couldn't be read.
    Empty(Option<IndexError>),
}

impl IndexEvent {
    /// Whether this is the last event of its run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IndexEvent::Progress(_))
    }
}

/// The single event from a composition run.
#[derive(Debug)]
pub enum ComposeEvent {
    /// Tiles in emission order.
    Tiles(Vec<Tile>),
    /// The composition could not start.
    Failed(ComposeError),
}

/// Monotonic request counter shared with worker threads.
#[derive(Debug, Clone, Default)]
struct Generation(Arc<AtomicU64>);

impl Generation {
    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs indexing and composition off the caller's thread.
pub struct Pipeline {
    indexer: Arc<ImageIndexer>,
    index_generation: Generation,
    compose_generation: Generation,
}

impl Pipeline {
    /// A pipeline indexing with `indexer`.
    pub fn new(indexer: ImageIndexer) -> Pipeline {
        Pipeline {
            indexer: Arc::new(indexer),
            index_generation: Generation::default(),
            compose_generation: Generation::default(),
        }
    }

    /// Start indexing `dir`, superseding any run in flight.
    ///
    /// A superseded run stops at its next image and sends nothing more.
    pub fn start_indexing(
        &self,
        dir: PathBuf,
        events: Sender<Envelope<IndexEvent>>,
    ) -> (u64, JoinHandle<()>) {
        let generation = self.index_generation.advance();
        let latest = self.index_generation.clone();
        let indexer = Arc::clone(&self.indexer);

        let handle = thread::spawn(move || {
            let send = |event| {
                // A dropped receiver just means nobody is listening any more
                let _ = events.send(Envelope { generation, event });
            };

            let result = indexer.index_until(
                &dir,
                |p| send(IndexEvent::Progress(p)),
                || latest.current() == generation,
            );

            match result {
                Ok(library) => send(IndexEvent::Ready(library)),
                Err(IndexError::Superseded) => debug!(generation, "indexing superseded"),
                Err(e @ (IndexError::NoImagesFound(_) | IndexError::NoUsableImages { .. })) => {
                    debug!(%e, "index is empty");
                    send(IndexEvent::Empty(None))
                }
                Err(e) => send(IndexEvent::Empty(Some(e))),
            }
        });

        (generation, handle)
    }

    /// Start composing `target`, superseding any composition in flight.
    pub fn start_composing(
        &self,
        target: Arc<RgbaImage>,
        palette: Arc<ColorIndex>,
        spec: MosaicSpec,
        events: Sender<Envelope<ComposeEvent>>,
    ) -> (u64, JoinHandle<()>) {
        let generation = self.compose_generation.advance();

        let handle = thread::spawn(move || {
            let event = match MosaicComposer::new(&palette) {
                Ok(composer) => {
                    ComposeEvent::Tiles(composer.compose(&target, &spec, &mut thread_rng()))
                }
                Err(e) => ComposeEvent::Failed(e),
            };
            let _ = events.send(Envelope { generation, event });
        });

        (generation, handle)
    }

    /// Whether `generation` is the latest indexing request.
    pub fn is_current_index(&self, generation: u64) -> bool {
        self.index_generation.current() == generation
    }

    /// Whether `generation` is the latest composition request.
    pub fn is_current_composition(&self, generation: u64) -> bool {
        self.compose_generation.current() == generation
    }
}
