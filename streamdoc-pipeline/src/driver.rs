//! Async driver
//!
//! [`StreamDriver`] owns a [`StreamSession`] and runs it on a single tokio task, so rebuilds
//! never overlap. Transport input reaches it as [`Command`]s on an unbounded channel. After
//! handling one command the driver drains everything else already queued, then rebuilds once
//! and publishes the document on a `watch` channel. Chunks that arrive while a rebuild is
//! running are queued and picked up by the next one.
//!
//! [`StreamHandle`] is the cloneable front end: it allocates epochs, forwards chunks, pumps a
//! transport stream on its own task and aborts that task when a new request begins.

use crate::error::PipelineError;
use crate::ir::nodes::Document;
use crate::pipeline::PipelineOptions;
use crate::session::{Epoch, StreamSession};
use futures::{pin_mut, Stream, StreamExt};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

/// Input for the driver task. Every command names the request it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin {
        epoch: Epoch,
    },
    Chunk {
        epoch: Epoch,
        bytes: Vec<u8>,
    },
    /// The connection closed, normally or with a transport error
    Closed {
        epoch: Epoch,
        result: Result<(), PipelineError>,
    },
}

/// Runs a session; see the module docs.
pub struct StreamDriver {
    session: StreamSession,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Arc<Document>>,
}

impl StreamDriver {
    /// Handles commands until every [`StreamHandle`] is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            let mut changed = self.handle(command);
            while let Ok(command) = self.commands.try_recv() {
                changed |= self.handle(command);
            }
            if changed {
                self.snapshots
                    .send_replace(Arc::new(self.session.snapshot()));
            }
        }
        debug!("all stream handles dropped, driver stopping");
    }

    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Begin { epoch } => {
                self.session.begin_at(epoch);
                true
            }
            Command::Chunk { epoch, bytes } => self.session.ingest(epoch, &bytes),
            Command::Closed {
                epoch,
                result: Ok(()),
            } => self.session.close(epoch),
            Command::Closed {
                epoch,
                result: Err(error),
            } => self.session.abort(epoch, error),
        }
    }
}

/// Cloneable handle to a running [`StreamDriver`].
#[derive(Clone)]
pub struct StreamHandle {
    commands: mpsc::UnboundedSender<Command>,
    epoch: Arc<AtomicU64>,
    transport: Arc<Mutex<Option<AbortHandle>>>,
    snapshots: watch::Receiver<Arc<Document>>,
}

impl StreamHandle {
    /// Starts a new request: aborts the pumped transport of the previous one and resets the
    /// session under a fresh epoch.
    pub fn begin(&self) -> Epoch {
        let epoch = Epoch::from(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
        if let Some(previous) = self.transport_slot().take() {
            previous.abort();
        }
        self.send(Command::Begin { epoch });
        epoch
    }

    pub fn current_epoch(&self) -> Epoch {
        Epoch::from(self.epoch.load(Ordering::SeqCst))
    }

    /// Forwards one chunk. Returns false when the driver has stopped.
    pub fn send_chunk(&self, epoch: Epoch, bytes: impl Into<Vec<u8>>) -> bool {
        self.send(Command::Chunk {
            epoch,
            bytes: bytes.into(),
        })
    }

    /// Reports the end of the connection.
    pub fn close(&self, epoch: Epoch, result: Result<(), PipelineError>) -> bool {
        self.send(Command::Closed { epoch, result })
    }

    /// Forwards a transport stream on its own task until it ends or fails.
    ///
    /// The task is aborted by the next [`StreamHandle::begin`].
    pub fn pump<S, B, E>(&self, epoch: Epoch, stream: S) -> JoinHandle<()>
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Display + Send + 'static,
    {
        let commands = self.commands.clone();
        let task = tokio::spawn(async move {
            pin_mut!(stream);
            while let Some(chunk) = stream.next().await {
                let command = match chunk {
                    Ok(bytes) => Command::Chunk {
                        epoch,
                        bytes: bytes.as_ref().to_vec(),
                    },
                    Err(error) => {
                        let _ = commands.send(Command::Closed {
                            epoch,
                            result: Err(PipelineError::transport(error.to_string())),
                        });
                        return;
                    }
                };
                if commands.send(command).is_err() {
                    return;
                }
            }
            let _ = commands.send(Command::Closed {
                epoch,
                result: Ok(()),
            });
        });

        let mut slot = self.transport_slot();
        if epoch == self.current_epoch() {
            if let Some(previous) = slot.replace(task.abort_handle()) {
                previous.abort();
            }
        } else {
            debug!(%epoch, "not pumping a transport for a cancelled request");
            task.abort();
        }
        task
    }

    /// Receiver of every published document.
    pub fn snapshots(&self) -> watch::Receiver<Arc<Document>> {
        self.snapshots.clone()
    }

    /// The most recently published document.
    pub fn latest(&self) -> Arc<Document> {
        Arc::clone(&self.snapshots.borrow())
    }

    fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    fn transport_slot(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a driver and its handle. Run the driver with [`StreamDriver::run`].
pub fn channel(options: &PipelineOptions) -> (StreamDriver, StreamHandle) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Document::default()));
    let driver = StreamDriver {
        session: StreamSession::new(options),
        commands: command_rx,
        snapshots: snapshot_tx,
    };
    let handle = StreamHandle {
        commands: command_tx,
        epoch: Arc::new(AtomicU64::new(0)),
        transport: Arc::new(Mutex::new(None)),
        snapshots: snapshot_rx,
    };
    (driver, handle)
}

/// Creates a driver and spawns it on the current tokio runtime.
pub fn spawn(options: &PipelineOptions) -> (StreamHandle, JoinHandle<()>) {
    let (driver, handle) = channel(options);
    let task = tokio::spawn(driver.run());
    (handle, task)
}
