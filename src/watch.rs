use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::{Duration, Instant};

use crate::Project;
use crate::error::{Error, Result};
use crate::scanner::PathMatcher;

const SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub poll: bool,
    pub poll_interval: Duration,
}

/// Decides which filesystem events warrant a new generation pass.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    matcher: PathMatcher,
    roots: Vec<PathBuf>,
    base_stylesheet: PathBuf,
    output: PathBuf,
    include_hidden: bool,
}

/// Canonical form of `path`; a removed path resolves through its parent.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|parent| parent.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

impl WatchFilter {
    pub fn new(project: &Project) -> Result<Self> {
        Ok(Self {
            matcher: PathMatcher::new(&project.request.scan)?,
            roots: project.request.scan.roots.iter().map(|root| resolve(root)).collect(),
            base_stylesheet: resolve(&project.request.base_stylesheet),
            output: resolve(&project.output),
            include_hidden: project.request.scan.include_hidden,
        })
    }

    pub fn is_relevant(&self, event: &Event) -> bool {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return false;
        }
        event
            .paths
            .iter()
            .any(|path| self.path_is_relevant(&event.kind, path))
    }

    fn path_is_relevant(&self, kind: &EventKind, path: &Path) -> bool {
        let path = resolve(path);
        if path == self.output {
            return false;
        }
        if path == self.base_stylesheet {
            return true;
        }
        self.roots.iter().any(|root| {
            let Ok(relative) = path.strip_prefix(root) else {
                return false;
            };
            if !self.include_hidden && is_hidden(relative) {
                return false;
            }
            if self.matcher.is_candidate(&path, root) {
                return true;
            }
            // A created, moved or removed directory can carry candidate files.
            changes_tree(kind, &path) && !self.matcher.is_ignored(&path, root)
        })
    }

    /// Directories to register with the watcher: every root plus the base
    /// stylesheet's directory when it lies outside them.
    fn watch_targets(&self) -> Vec<PathBuf> {
        let mut targets = self.roots.clone();
        if let Some(parent) = self.base_stylesheet.parent() {
            if !targets.iter().any(|root| parent.starts_with(root)) {
                targets.push(parent.to_path_buf());
            }
        }
        targets
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn changes_tree(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder)
        | EventKind::Remove(RemoveKind::Folder)
        | EventKind::Modify(ModifyKind::Name(_)) => true,
        EventKind::Create(_) => path.is_dir(),
        _ => false,
    }
}

/// Blocks until no relevant event has arrived for `quiet`. Other events are
/// drained without extending the wait.
fn settle<F>(rx: &Receiver<notify::Result<Event>>, quiet: Duration, is_relevant: F)
where
    F: Fn(&Event) -> bool,
{
    let mut deadline = Instant::now() + quiet;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match rx.recv_timeout(remaining) {
            Ok(Ok(event)) if is_relevant(&event) => deadline = Instant::now() + quiet,
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Runs an initial pass, then regenerates serially on every relevant change.
///
/// Only the initial pass is fatal; later failures are logged and the loop
/// keeps waiting for the next change.
pub fn watch(project: &Project, options: WatchOptions) -> Result<()> {
    let initial = crate::build_once(project)?;
    tracing::info!(
        "generated initial output in {} ms",
        initial.elapsed.as_millis()
    );

    let filter = WatchFilter::new(project)?;
    let (tx, rx) = channel();
    let mut watcher: Box<dyn Watcher> = if options.poll {
        Box::new(
            notify::PollWatcher::new(
                tx,
                notify::Config::default().with_poll_interval(options.poll_interval),
            )
            .map_err(Error::Watcher)?,
        )
    } else {
        Box::new(notify::recommended_watcher(tx).map_err(Error::Watcher)?)
    };

    for target in filter.watch_targets() {
        watcher
            .watch(&target, RecursiveMode::Recursive)
            .map_err(|source| Error::Watch {
                path: target.clone(),
                source,
            })?;
        tracing::info!("watching {}", target.display());
    }

    while let Ok(event) = rx.recv() {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::error!("watch error: {}", err);
                continue;
            }
        };
        if !filter.is_relevant(&event) {
            continue;
        }
        let trigger = event.paths.first().cloned().unwrap_or_default();

        // Let a burst of saves settle into a single pass.
        settle(&rx, SETTLE_DELAY, |event| filter.is_relevant(event));

        match crate::build_once(project) {
            Ok(result) => tracing::info!(
                "modified watched file '{}' - updated output in {} ms",
                trigger.display(),
                result.elapsed.as_millis()
            ),
            Err(err) => tracing::error!("build failed: {}", err),
        }
    }

    Ok(())
}
