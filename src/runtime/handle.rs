//! Handle and command-loop implementation.
//!
//! One tokio task owns the ledger and the scoring engine; every caller
//! goes through an mpsc command channel and gets its answer on a
//! oneshot. Durability runs on a separate worker that batches journal
//! ops into the sink.

use std::sync::{
    Arc,
    atomic::AtomicBool,
};

use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};

use crate::{
    contact::{Contact, ContactDraft, ContactPatch},
    engine::{Committed, RecalcError, RecalcSummary, ScoreEngine, recalc},
    export::{self, ExportError},
    import::{self, ImportError, ImportSummary},
    ledger::{ContactLedger, LedgerSnapshotV1, StoreError},
    op::{Op, StoredOp},
    persist::{OpSink, PersistError},
    rules::Totals,
    types::{ContactId, ContestId, OpSeq},
};

use super::events::LogEvent;

/// Runtime-facing error type.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Ledger rejected the mutation.
    #[error("ledger error: {0:?}")]
    Store(#[from] StoreError),
    /// Persistence failure.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Recalculation failure or cancellation.
    #[error(transparent)]
    Recalc(#[from] RecalcError),
    /// ADIF import failure.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// Export failure.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// The runtime task is gone.
    #[error("runtime channel closed")]
    ChannelClosed,
}

/// Tunables for the persistence worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Flush the sink eagerly when the batch contains an insert.
    pub flush_on_insert: bool,
    /// Max ops per batch before a forced flush.
    pub batch_max_ops: usize,
    /// Max time an op may sit in the batch buffer.
    pub batch_max_latency_ms: u64,
    /// Bound of the runtime-to-worker queue.
    pub persist_queue_bound: usize,
    /// Auto-checkpoint after this many ops (0 disables).
    pub snapshot_every_ops: usize,
    /// Delete journaled events covered by each snapshot.
    pub compact_after_snapshot: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_on_insert: true,
            batch_max_ops: 32,
            batch_max_latency_ms: 75,
            persist_queue_bound: 64,
            snapshot_every_ops: 2000,
            compact_after_snapshot: false,
        }
    }
}

/// Cloneable handle to a running contest log.
pub struct ContestLogHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LogEvent>,
}

impl Clone for ContestLogHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Log {
        draft: ContactDraft,
        resp: oneshot::Sender<Result<Committed, RuntimeError>>,
    },
    Edit {
        id: ContactId,
        patch: ContactPatch,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Recalculate {
        cancel: Arc<AtomicBool>,
        resp: oneshot::Sender<Result<RecalcSummary, RuntimeError>>,
    },
    ImportAdif {
        text: String,
        resp: oneshot::Sender<Result<ImportSummary, RuntimeError>>,
    },
    Prefill {
        resp: oneshot::Sender<String>,
    },
    Get {
        id: ContactId,
        resp: oneshot::Sender<Option<Contact>>,
    },
    Recent {
        n: usize,
        resp: oneshot::Sender<Vec<Contact>>,
    },
    ByCall {
        call: String,
        resp: oneshot::Sender<Vec<Contact>>,
    },
    Totals {
        resp: oneshot::Sender<Totals>,
    },
    ClaimedScore {
        resp: oneshot::Sender<i64>,
    },
    ExportCabrillo {
        resp: oneshot::Sender<String>,
    },
    ExportAdif {
        resp: oneshot::Sender<String>,
    },
    ExportEdi {
        resp: oneshot::Sender<Result<String, RuntimeError>>,
    },
    Flush {
        resp: oneshot::Sender<Result<OpSeq, RuntimeError>>,
    },
    Checkpoint {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

enum SinkMsg {
    Op(StoredOp),
    Flush {
        resp: oneshot::Sender<Result<OpSeq, PersistError>>,
    },
    Checkpoint {
        snapshot: LedgerSnapshotV1,
        last_seq: OpSeq,
        compact: bool,
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Spawns the single-writer loop for one contest run and returns its
/// handle.
pub fn spawn_contest_log(
    engine: ScoreEngine,
    ledger: ContactLedger,
    contest: ContestId,
    sink: Option<Box<dyn OpSink>>,
    config: RuntimeConfig,
) -> ContestLogHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<LogEvent>(1024);

    let (persist_tx, mut durable_rx) = if let Some(sink) = sink {
        let (persist_tx, persist_rx) = mpsc::channel::<SinkMsg>(config.persist_queue_bound);
        let (durable_tx, durable_rx) = mpsc::unbounded_channel::<Result<OpSeq, PersistError>>();
        spawn_persistence_worker(sink, persist_rx, durable_tx, config.clone());
        (Some(persist_tx), Some(durable_rx))
    } else {
        (None, None)
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut ledger = ledger;
        let mut ops_since_snapshot = 0usize;

        loop {
            if let Some(rx) = durable_rx.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        let done = handle_command(
                            cmd,
                            &engine,
                            &mut ledger,
                            contest,
                            &events_tx_loop,
                            persist_tx.as_ref(),
                            &config,
                            &mut ops_since_snapshot,
                        ).await;
                        if done {
                            break;
                        }
                    }
                    durable = rx.recv() => {
                        if let Some(Ok(op_seq)) = durable {
                            let _ = events_tx_loop.send(LogEvent::DurableUpTo { op_seq });
                        }
                    }
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break; };
                let done = handle_command(
                    cmd,
                    &engine,
                    &mut ledger,
                    contest,
                    &events_tx_loop,
                    persist_tx.as_ref(),
                    &config,
                    &mut ops_since_snapshot,
                )
                .await;
                if done {
                    break;
                }
            }
        }
    });

    ContestLogHandle { cmd_tx, events_tx }
}

macro_rules! request {
    ($self:ident, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        let (tx, rx) = oneshot::channel();
        $self
            .cmd_tx
            .send(Command::$variant { $($field: $value,)* resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }};
}

impl ContestLogHandle {
    /// Subscribes to the runtime's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events_tx.subscribe()
    }

    /// Scores and logs a draft; dupes are logged with zero points.
    pub async fn log(&self, draft: ContactDraft) -> Result<Committed, RuntimeError> {
        request!(self, Log { draft: draft })?
    }

    /// Applies an operator edit. The stored score is not recomputed;
    /// run [`ContestLogHandle::recalculate`] afterwards.
    pub async fn edit(&self, id: ContactId, patch: ContactPatch) -> Result<(), RuntimeError> {
        request!(self, Edit { id: id, patch: patch })?
    }

    /// Runs the full recalculation replay. `cancel` may be raised from
    /// any thread to abort cooperatively.
    pub async fn recalculate(
        &self,
        cancel: Arc<AtomicBool>,
    ) -> Result<RecalcSummary, RuntimeError> {
        request!(self, Recalculate { cancel: cancel })?
    }

    /// Imports an ADIF document into this contest run.
    pub async fn import_adif(&self, text: impl Into<String>) -> Result<ImportSummary, RuntimeError> {
        request!(self, ImportAdif { text: text.into() })?
    }

    /// Proposed sent exchange for the next contact.
    pub async fn prefill(&self) -> Result<String, RuntimeError> {
        request!(self, Prefill {})
    }

    /// Fetches one contact.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>, RuntimeError> {
        request!(self, Get { id: id })
    }

    /// Last `n` contacts in insertion order.
    pub async fn recent(&self, n: usize) -> Result<Vec<Contact>, RuntimeError> {
        request!(self, Recent { n: n })
    }

    /// All contacts previously logged with this callsign.
    pub async fn by_call(&self, call: impl Into<String>) -> Result<Vec<Contact>, RuntimeError> {
        request!(self, ByCall { call: call.into() })
    }

    /// Aggregate totals.
    pub async fn totals(&self) -> Result<Totals, RuntimeError> {
        request!(self, Totals {})
    }

    /// Claimed score per the contest's formula.
    pub async fn claimed_score(&self) -> Result<i64, RuntimeError> {
        request!(self, ClaimedScore {})
    }

    /// Renders the Cabrillo document.
    pub async fn export_cabrillo(&self) -> Result<String, RuntimeError> {
        request!(self, ExportCabrillo {})
    }

    /// Renders the ADIF document.
    pub async fn export_adif(&self) -> Result<String, RuntimeError> {
        request!(self, ExportAdif {})
    }

    /// Renders the EDI document, for contests that define it.
    pub async fn export_edi(&self) -> Result<String, RuntimeError> {
        request!(self, ExportEdi {})?
    }

    /// Forces all buffered ops to stable storage.
    pub async fn flush(&self) -> Result<OpSeq, RuntimeError> {
        request!(self, Flush {})?
    }

    /// Writes a snapshot (and optionally compacts the journal).
    pub async fn checkpoint(&self) -> Result<(), RuntimeError> {
        request!(self, Checkpoint {})?
    }

    /// Flushes and stops the runtime.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        request!(self, Shutdown {})?
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_command(
    cmd: Command,
    engine: &ScoreEngine,
    ledger: &mut ContactLedger,
    contest: ContestId,
    events_tx: &broadcast::Sender<LogEvent>,
    persist_tx: Option<&mpsc::Sender<SinkMsg>>,
    config: &RuntimeConfig,
    ops_since_snapshot: &mut usize,
) -> bool {
    match cmd {
        Command::Log { draft, resp } => {
            let res = engine
                .commit(ledger, draft)
                .map_err(RuntimeError::from)
                .and_then(|committed| {
                    persist_pending(ledger, persist_tx, events_tx)?;
                    let _ = events_tx.send(LogEvent::Logged {
                        id: committed.id,
                        dupe: committed.evaluation.is_dupe,
                    });
                    Ok(committed)
                });
            if let Ok(committed) = &res {
                log::debug!(
                    "logged contact {} ({} pts, dupe={})",
                    committed.id,
                    committed.evaluation.score.points,
                    committed.evaluation.is_dupe
                );
                *ops_since_snapshot += 1;
                maybe_auto_checkpoint(ledger, persist_tx, config, ops_since_snapshot).await;
            }
            let _ = resp.send(res);
        }
        Command::Edit { id, patch, resp } => {
            let res = ledger
                .patch(id, patch)
                .map_err(RuntimeError::from)
                .and_then(|_| {
                    persist_pending(ledger, persist_tx, events_tx)?;
                    let _ = events_tx.send(LogEvent::Edited { id });
                    Ok(())
                });
            let _ = resp.send(res);
        }
        Command::Recalculate { cancel, resp } => {
            let res = recalc::recalculate(
                engine.rules().as_ref(),
                engine.profile(),
                ledger,
                contest,
                &cancel,
            )
            .map_err(RuntimeError::from)
            .and_then(|summary| {
                persist_pending(ledger, persist_tx, events_tx)?;
                log::info!(
                    "recalculation scanned {} contacts, rewrote {}",
                    summary.scanned,
                    summary.rewritten
                );
                let _ = events_tx.send(LogEvent::Recalculated {
                    rewritten: summary.rewritten,
                });
                Ok(summary)
            });
            if matches!(res, Err(RuntimeError::Recalc(RecalcError::Cancelled))) {
                // Partial rescores are already journaled; a re-run
                // converges, but the ops still need to be durable.
                let _ = persist_pending(ledger, persist_tx, events_tx);
                log::info!("recalculation cancelled");
            }
            let _ = resp.send(res);
        }
        Command::ImportAdif { text, resp } => {
            let res = import::import_adif(engine, ledger, contest, &text)
                .map_err(RuntimeError::from)
                .and_then(|summary| {
                    persist_pending(ledger, persist_tx, events_tx)?;
                    log::info!(
                        "ADIF import: {} committed, {} duplicates",
                        summary.imported,
                        summary.duplicates
                    );
                    let _ = events_tx.send(LogEvent::Imported {
                        imported: summary.imported,
                        duplicates: summary.duplicates,
                    });
                    Ok(summary)
                });
            let _ = resp.send(res);
        }
        Command::Prefill { resp } => {
            let _ = resp.send(engine.rules().prefill(ledger, contest));
        }
        Command::Get { id, resp } => {
            let _ = resp.send(ledger.get_cloned(id));
        }
        Command::Recent { n, resp } => {
            let _ = resp.send(ledger.recent(contest, n));
        }
        Command::ByCall { call, resp } => {
            let _ = resp.send(ledger.by_call(&call).into_iter().cloned().collect());
        }
        Command::Totals { resp } => {
            let _ = resp.send(engine.totals(ledger, contest));
        }
        Command::ClaimedScore { resp } => {
            let _ = resp.send(engine.claimed_score(ledger, contest));
        }
        Command::ExportCabrillo { resp } => {
            let claimed = engine.claimed_score(ledger, contest);
            let _ = resp.send(export::cabrillo::render(
                engine.rules().as_ref(),
                engine.profile(),
                ledger,
                contest,
                claimed,
            ));
        }
        Command::ExportAdif { resp } => {
            let _ = resp.send(export::adif::render(
                engine.rules().as_ref(),
                engine.profile(),
                ledger,
                contest,
            ));
        }
        Command::ExportEdi { resp } => {
            let claimed = engine.claimed_score(ledger, contest);
            let res = export::edi::render(
                engine.rules().as_ref(),
                engine.profile(),
                ledger,
                contest,
                claimed,
            )
            .map_err(RuntimeError::from);
            let _ = resp.send(res);
        }
        Command::Flush { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (flush_tx, flush_rx) = oneshot::channel();
                if tx.send(SinkMsg::Flush { resp: flush_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    flush_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(ledger.latest_op_seq())
            };
            let _ = resp.send(out);
        }
        Command::Checkpoint { resp } => {
            let out = request_checkpoint(ledger, persist_tx, config.compact_after_snapshot).await;
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(SinkMsg::Shutdown { resp: done_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
                }
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

fn persist_pending(
    ledger: &mut ContactLedger,
    persist_tx: Option<&mpsc::Sender<SinkMsg>>,
    events_tx: &broadcast::Sender<LogEvent>,
) -> Result<(), RuntimeError> {
    let ops = ledger.drain_pending_ops();
    if let Some(tx) = persist_tx {
        for op in ops {
            tx.try_send(SinkMsg::Op(op)).map_err(|err| {
                log::warn!("persist queue error: {err}");
                RuntimeError::Persist(PersistError::Message(format!(
                    "persist queue error: {err}"
                )))
            })?;
        }
    } else if !ops.is_empty() {
        // No sink: everything in memory is as durable as it gets.
        let _ = events_tx.send(LogEvent::DurableUpTo {
            op_seq: ledger.latest_op_seq(),
        });
    }
    Ok(())
}

async fn request_checkpoint(
    ledger: &ContactLedger,
    persist_tx: Option<&mpsc::Sender<SinkMsg>>,
    compact: bool,
) -> Result<(), RuntimeError> {
    let Some(tx) = persist_tx else {
        return Ok(());
    };
    let snapshot = ledger.export_snapshot();
    let last_seq = ledger.latest_op_seq();
    let (cp_tx, cp_rx) = oneshot::channel();
    if tx
        .send(SinkMsg::Checkpoint {
            snapshot,
            last_seq,
            compact,
            resp: cp_tx,
        })
        .await
        .is_err()
    {
        return Err(RuntimeError::ChannelClosed);
    }
    cp_rx
        .await
        .map_err(|_| RuntimeError::ChannelClosed)?
        .map_err(RuntimeError::from)
}

async fn maybe_auto_checkpoint(
    ledger: &ContactLedger,
    persist_tx: Option<&mpsc::Sender<SinkMsg>>,
    config: &RuntimeConfig,
    ops_since_snapshot: &mut usize,
) {
    if config.snapshot_every_ops == 0 || *ops_since_snapshot < config.snapshot_every_ops {
        return;
    }
    if request_checkpoint(ledger, persist_tx, config.compact_after_snapshot)
        .await
        .is_ok()
    {
        *ops_since_snapshot = 0;
    }
}

fn spawn_persistence_worker(
    sink: Box<dyn OpSink>,
    mut rx: mpsc::Receiver<SinkMsg>,
    durable_tx: mpsc::UnboundedSender<Result<OpSeq, PersistError>>,
    config: RuntimeConfig,
) {
    let sink = Arc::new(Mutex::new(sink));
    tokio::spawn(async move {
        let mut buf = Vec::<StoredOp>::new();
        let mut deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
        let mut last_durable: OpSeq = 0;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                        break;
                    };

                    match msg {
                        SinkMsg::Op(stored) => {
                            let is_insert = matches!(stored.op, Op::Insert { .. });
                            buf.push(stored);

                            if buf.len() >= config.batch_max_ops
                                || (config.flush_on_insert && is_insert)
                            {
                                let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                                deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                            }
                        }
                        SinkMsg::Flush { resp } => {
                            let result = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                            let _ = resp.send(result.map(|_| last_durable));
                            deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                        }
                        SinkMsg::Checkpoint { snapshot, last_seq, compact, resp } => {
                            let flushed = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                            let result = match flushed {
                                Err(err) => Err(err),
                                Ok(()) => {
                                    let sink_ref = Arc::clone(&sink);
                                    match tokio::task::spawn_blocking(move || {
                                        let mut sink = sink_ref.blocking_lock();
                                        sink.write_snapshot(&snapshot, last_seq)?;
                                        if compact {
                                            let _ = sink.compact_through(last_seq)?;
                                        }
                                        Result::<(), PersistError>::Ok(())
                                    }).await {
                                        Ok(inner) => inner,
                                        Err(e) => Err(PersistError::Message(format!("join error: {e}"))),
                                    }
                                }
                            };
                            let _ = resp.send(result);
                            deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                        }
                        SinkMsg::Shutdown { resp } => {
                            let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, true).await;
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if !buf.is_empty() => {
                    let _ = flush_buf(&sink, &mut buf, &mut last_durable, &durable_tx, false).await;
                    deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                }
            }
        }
    });
}

async fn flush_buf(
    sink: &Arc<Mutex<Box<dyn OpSink>>>,
    buf: &mut Vec<StoredOp>,
    last_durable: &mut OpSeq,
    durable_tx: &mpsc::UnboundedSender<Result<OpSeq, PersistError>>,
    call_flush: bool,
) -> Result<(), PersistError> {
    if buf.is_empty() {
        if call_flush {
            let sink_ref = Arc::clone(sink);
            tokio::task::spawn_blocking(move || {
                let mut sink = sink_ref.blocking_lock();
                sink.flush()
            })
            .await
            .map_err(|e| PersistError::Message(format!("join error: {e}")))??;
        }
        return Ok(());
    }

    let ops = std::mem::take(buf);
    let sink_ref = Arc::clone(sink);
    let append_res: Result<OpSeq, PersistError> = tokio::task::spawn_blocking(move || {
        let mut sink = sink_ref.blocking_lock();
        let seq = sink.append_ops(&ops)?;
        if call_flush {
            sink.flush()?;
        }
        Ok(seq)
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))?;

    match append_res {
        Ok(seq) => {
            *last_durable = (*last_durable).max(seq);
            let _ = durable_tx.send(Ok(*last_durable));
            Ok(())
        }
        Err(err) => {
            log::error!("journal append failed: {err}");
            let _ = durable_tx.send(Err(PersistError::Message(format!(
                "append failed: {err}"
            ))));
            Err(err)
        }
    }
}
