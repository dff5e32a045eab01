//! Watch mode: poll the source tree and rebuild on change.
//!
//! Change detection compares successive [`Snapshot`]s of the watch root:
//! each file's modification time and length. Hidden entries and
//! `node_modules` are skipped, as are the cache and output directories when
//! they sit inside the watch root (publishing would otherwise trigger a
//! rebuild of its own).
//!
//! Builds run on a worker thread so polling continues while a build is in
//! flight; the [`BuildTrigger`] decides when a build may start. A failed
//! build is reported and watching carries on.

use crate::pipeline::{BuildError, BuildSummary};
use crate::trigger::{BuildTrigger, TriggerAction};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Modification stamp of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Stamps of every watched file under a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, FileStamp>,
}

/// Difference between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

fn is_skipped(entry: &DirEntry, exclude: &[PathBuf]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || name == "node_modules"
        || exclude.iter().any(|ex| entry.path() == ex)
}

impl Snapshot {
    /// Walk `root` and record every regular file not under `exclude`.
    ///
    /// Unreadable entries are ignored; a missing root gives an empty snapshot.
    pub fn capture(root: &Path, exclude: &[PathBuf]) -> Self {
        let files = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_skipped(e, exclude))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let meta = e.metadata().ok()?;
                let stamp = FileStamp {
                    modified: meta.modified().ok(),
                    len: meta.len(),
                };
                Some((e.into_path(), stamp))
            })
            .collect();
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// What changed going from `self` to `newer`.
    pub fn diff(&self, newer: &Snapshot) -> Changes {
        let mut changes = Changes::default();
        for (path, stamp) in &newer.files {
            match self.files.get(path) {
                None => changes.added.push(path.clone()),
                Some(old) if old != stamp => changes.modified.push(path.clone()),
                Some(_) => {}
            }
        }
        for path in self.files.keys() {
            if !newer.files.contains_key(path) {
                changes.removed.push(path.clone());
            }
        }
        changes
    }
}

/// What the watcher observed during one poll.
#[derive(Debug)]
pub enum WatchEvent {
    Changed(Changes),
    BuildStarted,
    BuildFinished(Result<BuildSummary, BuildError>),
}

type BuildFn = dyn Fn() -> Result<BuildSummary, BuildError> + Send + Sync;

/// Polling watcher driving builds through a [`BuildTrigger`].
pub struct Watcher {
    root: PathBuf,
    exclude: Vec<PathBuf>,
    poll_interval: Duration,
    trigger: BuildTrigger,
    snapshot: Snapshot,
    build: Arc<BuildFn>,
    done_tx: Sender<Result<BuildSummary, BuildError>>,
    done_rx: Receiver<Result<BuildSummary, BuildError>>,
}

impl Watcher {
    pub fn new<F>(
        root: PathBuf,
        exclude: Vec<PathBuf>,
        debounce: Duration,
        poll_interval: Duration,
        build: F,
    ) -> Self
    where
        F: Fn() -> Result<BuildSummary, BuildError> + Send + Sync + 'static,
    {
        let snapshot = Snapshot::capture(&root, &exclude);
        debug!("watching {} files under {}", snapshot.len(), root.display());
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            root,
            exclude,
            poll_interval,
            trigger: BuildTrigger::new(debounce),
            snapshot,
            build: Arc::new(build),
            done_tx,
            done_rx,
        }
    }

    fn spawn_build(&self) {
        let build = Arc::clone(&self.build);
        let done = self.done_tx.clone();
        std::thread::spawn(move || {
            let _ = done.send(build());
        });
    }

    /// Start a build right away, ignoring the debounce.
    ///
    /// Returns false if one is already running.
    pub fn build_now(&mut self) -> bool {
        if !self.trigger.start_now() {
            return false;
        }
        self.spawn_build();
        true
    }

    /// One polling round at `now`.
    pub fn step(&mut self, now: Instant) -> Vec<WatchEvent> {
        let mut events = Vec::new();

        match self.done_rx.try_recv() {
            Ok(result) => {
                self.trigger.on_build_finished(now);
                events.push(WatchEvent::BuildFinished(result));
            }
            Err(TryRecvError::Empty) => {}
            // The watcher holds a sender, so the channel never disconnects.
            Err(TryRecvError::Disconnected) => {}
        }

        let current = Snapshot::capture(&self.root, &self.exclude);
        let changes = self.snapshot.diff(&current);
        if !changes.is_empty() {
            trace!("{} paths changed", changes.len());
            self.trigger.on_change(now);
            self.snapshot = current;
            events.push(WatchEvent::Changed(changes));
        }

        if self.trigger.on_tick(now) == TriggerAction::StartBuild {
            self.spawn_build();
            events.push(WatchEvent::BuildStarted);
        }

        events
    }

    /// Build once, then poll forever, handing every event to `on_event`.
    pub fn run(mut self, mut on_event: impl FnMut(WatchEvent)) -> ! {
        if self.build_now() {
            on_event(WatchEvent::BuildStarted);
        }
        loop {
            std::thread::sleep(self.poll_interval);
            for event in self.step(Instant::now()) {
                on_event(event);
            }
        }
    }
}
