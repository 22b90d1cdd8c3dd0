//! File store watching for preview reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use vitrine_store::SITES;

/// Events emitted by the store watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A site document was written
    SiteChanged(String),

    /// A site document was deleted
    SiteRemoved(String),
}

/// Watches a file store directory for site document changes.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
}

impl StoreWatcher {
    /// Watch the store rooted at `root`.
    ///
    /// Returns the watcher and a channel to receive events. The watcher stops
    /// when dropped.
    pub fn new(root: &Path) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let sites_dir = root.join(SITES);
        std::fs::create_dir_all(&sites_dir)?;
        watcher
            .watch(&sites_dir, RecursiveMode::NonRecursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            let debounce = Duration::from_millis(100);
            let mut last: Option<(WatchEvent, std::time::Instant)> = None;

            while let Ok(event) = sync_rx.recv() {
                for path in event.paths {
                    let Some(watch_event) = classify_event(&path, &event.kind) else {
                        continue;
                    };

                    // Collapse bursts for the same site
                    let now = std::time::Instant::now();
                    if let Some((prev, at)) = &last {
                        if *prev == watch_event && now.duration_since(*at) < debounce {
                            continue;
                        }
                    }
                    last = Some((watch_event.clone(), now));

                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event on `<root>/sites/<id>.json`.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let client_id = path.file_stem()?.to_str()?.to_string();

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::SiteChanged(client_id)),
        EventKind::Remove(_) => Some(WatchEvent::SiteRemoved(client_id)),
        _ => None,
    }
}

/// Path a site document lives at inside a file store.
pub fn site_path(root: &Path, client_id: &str) -> PathBuf {
    root.join(SITES).join(format!("{}.json", client_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::EventKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_site_documents() {
        let root = Path::new("/data");

        assert_eq!(
            classify_event(&site_path(root, "ana"), &EventKind::Modify(ModifyKind::Any)),
            Some(WatchEvent::SiteChanged("ana".to_string()))
        );
        assert_eq!(
            classify_event(&site_path(root, "ana"), &EventKind::Remove(RemoveKind::File)),
            Some(WatchEvent::SiteRemoved("ana".to_string()))
        );
        assert_eq!(
            classify_event(
                Path::new("/data/sites/ana.json.tmp"),
                &EventKind::Create(CreateKind::File)
            ),
            None
        );
    }

    #[tokio::test]
    async fn watches_site_writes() {
        let temp = tempdir().unwrap();

        let (watcher, mut rx) = StoreWatcher::new(temp.path()).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(site_path(temp.path(), "ana"), "{}").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        assert_eq!(
            event.unwrap(),
            Some(WatchEvent::SiteChanged("ana".to_string()))
        );
    }
}
