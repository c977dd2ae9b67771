use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Everything the app loop reacts to. All sources feed one queue, so events
/// are handled strictly one after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One line typed by the user.
    Input(String),
    /// Periodic tick, used to notice that the date changed.
    Update,
    /// The store file was changed on disk.
    ExternalModification,
    /// Standard input reached its end.
    InputClosed,
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
    _watcher: Option<RecommendedWatcher>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_config(&Config::default())
    }
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Dispatcher {
        let tick_rate = config.tick_rate();
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for line in stdin.lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(Event::Input(line)).is_err() {
                                return;
                            }
                        }
                        Err(err) => log::warn!("Could not read input: {}", err),
                    }
                }
                let _ = tx.send(Event::InputClosed);
            })
        };
        let tx_upd = tx.clone();
        let update_handle = thread::spawn(move || {
            while tx_upd.send(Event::Update).is_ok() {
                thread::sleep(tick_rate);
            }
        });
        Dispatcher {
            rx,
            tx,
            _input_handle: input_handle,
            _update_handle: update_handle,
            _watcher: None,
        }
    }

    /// Emits `Event::ExternalModification` whenever `path` is created,
    /// changed or removed.
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let file_name = path.file_name().map(|name| name.to_owned());
        let tx = self.tx.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    let relevant = matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) && event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref());

                    if relevant {
                        let _ = tx.send(Event::ExternalModification);
                    }
                }
                Err(err) => log::warn!("File watcher failed: {}", err),
            },
        )
        .map_err(watch_error)?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;
        log::debug!("Watching '{}' for changes", path.display());

        self._watcher = Some(watcher);
        Ok(())
    }

    pub fn next(&self) -> std::result::Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

fn watch_error(err: notify::Error) -> Error {
    Error::new(
        ErrorKind::Persistence,
        &format!("could not watch event store: {}", err),
    )
}
