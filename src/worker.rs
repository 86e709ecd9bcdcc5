//! Periodic sampling off the UI task.
//!
//! The collector (and with it the PID → counters table) lives inside the
//! worker and is moved into each blocking pass and back out again. A pass
//! that is abandoned on shutdown takes its counters with it, so no half
//! applied state can be observed and nothing is published afterwards.
//! Exports are written only from a pass the worker has taken back.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::export;
use crate::system::collector::Collector;
use crate::system::sampler::{ProcessSource, SysinfoSource};
use crate::system::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerCommand {
    /// Sample now instead of waiting for the next tick.
    Refresh,
    /// Sample now and write the full, unfiltered result to a file.
    Export(PathBuf),
}

#[derive(Debug)]
pub enum WorkerEvent {
    Sampled(Arc<Snapshot>),
    Exported { path: PathBuf, count: usize },
    ExportFailed(String),
}

pub struct SamplingWorker {
    commands: mpsc::UnboundedSender<WorkerCommand>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

enum Job {
    Tick,
    Export(PathBuf),
}

impl SamplingWorker {
    pub fn spawn<S>(
        collector: Collector<S>,
        period: Duration,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> Self
    where
        S: ProcessSource + Send + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(collector, period, command_rx, shutdown_rx, events));
        SamplingWorker {
            commands,
            shutdown: Some(shutdown),
            task,
        }
    }

    pub fn send(&self, command: WorkerCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("sampling worker has stopped; command dropped");
        }
    }

    /// Stops the worker. An in-flight pass is abandoned.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            tracing::error!(error = %err, "sampling worker panicked");
        }
    }
}

async fn run<S>(
    mut collector: Collector<S>,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<WorkerCommand>,
    mut shutdown: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<WorkerEvent>,
) where
    S: ProcessSource + Send + 'static,
{
    let mut ticker = tokio::time::interval(period);
    // One pass at a time: ticks that fire during a slow pass are dropped.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let (job, scheduled) = tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => (Job::Tick, true),
            command = commands.recv() => match command {
                Some(WorkerCommand::Refresh) => (Job::Tick, false),
                Some(WorkerCommand::Export(path)) => (Job::Export(path), false),
                None => break,
            },
        };

        let pass = tokio::task::spawn_blocking(move || {
            let snapshot = collector.refresh();
            (collector, snapshot)
        });

        let (returned, snapshot) = tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!("shutdown requested; abandoning in-flight pass");
                return;
            }
            joined = pass => match joined {
                Ok(done) => done,
                Err(err) => {
                    tracing::error!(error = %err, "sampling pass failed");
                    return;
                }
            },
        };
        collector = returned;
        if !scheduled {
            // Keep a full period between this pass and the next tick.
            ticker.reset();
        }

        if let Job::Export(path) = job {
            let event = match export::export_to_path(&path, &snapshot.records) {
                Ok(count) => WorkerEvent::Exported { path, count },
                Err(err) => WorkerEvent::ExportFailed(err.to_string()),
            };
            if events.send(event).is_err() {
                break;
            }
        }
        if events.send(WorkerEvent::Sampled(Arc::new(snapshot))).is_err() {
            break;
        }
    }

    tracing::debug!("sampling worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::sampler::Sampler;
    use crate::system::sampler::tests::{FakeSource, entry};

    fn fake_source(frames: usize) -> FakeSource {
        let mut source = FakeSource::default();
        for i in 0..frames {
            source
                .frames
                .push_back(vec![Ok(entry(1, "a", 1024, i as u64 * 10))]);
        }
        source
    }

    fn fake_collector(frames: usize) -> Collector<FakeSource> {
        collector_from(fake_source(frames))
    }

    fn collector_from(source: FakeSource) -> Collector<FakeSource> {
        Collector::from_sampler(Sampler::with_source(source, Duration::from_secs(1)))
    }

    fn scratch_path(test: &str) -> PathBuf {
        std::env::temp_dir().join(format!("procscope_{test}_{}.csv", std::process::id()))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn publishes_complete_snapshots_until_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = SamplingWorker::spawn(fake_collector(3), Duration::from_millis(5), tx);

        for _ in 0..2 {
            match rx.recv().await {
                Some(WorkerEvent::Sampled(snapshot)) => assert_eq!(snapshot.records.len(), 1),
                other => panic!("unexpected event: {other:?}"),
            }
        }

        worker.shutdown().await;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, WorkerEvent::Sampled(_)));
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn export_command_writes_a_fresh_snapshot() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = SamplingWorker::spawn(fake_collector(4), Duration::from_secs(3600), tx);
        // First interval tick fires immediately.
        assert!(matches!(rx.recv().await, Some(WorkerEvent::Sampled(_))));

        let path = scratch_path("worker_export");
        worker.send(WorkerCommand::Export(path.clone()));

        match rx.recv().await {
            Some(WorkerEvent::Exported { path: written, count }) => {
                assert_eq!(written, path);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("PID,Process Name,Memory (MB)"));
        let _ = std::fs::remove_file(&path);

        worker.shutdown().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refresh_right_after_a_tick_stays_in_range() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = SamplingWorker::spawn(fake_collector(4), Duration::from_secs(3600), tx);
        assert!(matches!(rx.recv().await, Some(WorkerEvent::Sampled(_))));

        worker.send(WorkerCommand::Refresh);
        match rx.recv().await {
            Some(WorkerEvent::Sampled(snapshot)) => {
                let cpu = snapshot.records[0].cpu_percent;
                assert!((0.0..=100.0).contains(&cpu), "cpu {cpu}");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        worker.shutdown().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn shutdown_during_export_pass_writes_nothing() {
        let mut source = fake_source(4);
        source.probe_delay = Some(Duration::from_millis(100));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = SamplingWorker::spawn(collector_from(source), Duration::from_secs(3600), tx);
        assert!(matches!(rx.recv().await, Some(WorkerEvent::Sampled(_))));

        let path = scratch_path("abandoned_export");
        let _ = std::fs::remove_file(&path);
        worker.send(WorkerCommand::Export(path.clone()));
        // Let the worker start the slow pass.
        tokio::time::sleep(Duration::from_millis(20)).await;
        worker.shutdown().await;

        // Outlive the abandoned pass.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!path.exists());
        assert!(rx.recv().await.is_none());
    }
}
