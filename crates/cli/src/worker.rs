//! Executes queued writes.
//!
//! The interactive grid never blocks on the network: each write runs on its
//! own thread and reports back through a channel. Completions therefore
//! arrive in whatever order the service answers.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use duudl_client::PersistenceClient;
use duudl_grid::{Completion, WriteRequest};

/// Run one write synchronously.
pub fn execute(client: &dyn PersistenceClient, request: &WriteRequest) -> Completion {
    let result = client
        .update_response(&request.to_update())
        .map_err(|e| e.to_string());
    if let Err(e) = &result {
        log::warn!("write #{} for {} failed: {}", request.ticket, request.key, e);
    }
    Completion { ticket: request.ticket, result }
}

pub struct WriteWorker {
    client: Arc<dyn PersistenceClient>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl WriteWorker {
    pub fn new(client: Arc<dyn PersistenceClient>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { client, tx, rx }
    }

    /// Fire and forget.
    pub fn submit(&self, request: WriteRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let completion = execute(client.as_ref(), &request);
            // Receiver gone means the grid has shut down.
            let _ = tx.send(completion);
        });
    }

    /// Completions that have arrived so far.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Completion> {
        self.rx.recv_timeout(timeout).ok()
    }
}
