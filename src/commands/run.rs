use std::future::Future;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use piclock_core::{ClockConfig, DisplaySink, FetchLauncher, Launch, RefreshScheduler};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::render::TerminalSink;

/// Tick once a second until Ctrl-C or `q`.
///
/// Any other line on stdin requests a refresh.
pub async fn run(config: ClockConfig, test: bool) -> Result<()> {
    let mut launcher = FetchLauncher::new(&config.fetch, config.paths()?);
    if test {
        launcher = launcher.dry_run();
    }

    let mut scheduler = RefreshScheduler::from_config(&config, launcher)?;
    if test {
        scheduler = scheduler.test_mode();
    }

    tracing::info!(
        test,
        first_fetch_in = scheduler.countdown(),
        "piclock started"
    );

    let mut sink = TerminalSink::default();
    let input = spawn_line_reader(BufReader::new(std::io::stdin()));
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    drive(&mut scheduler, &mut sink, input, shutdown).await;

    tracing::info!("piclock stopped");
    Ok(())
}

/// Forward lines from a blocking reader over a channel.
///
/// The reader runs on its own thread so a read that never completes cannot
/// hold up shutdown; the thread is simply abandoned when the process exits.
fn spawn_line_reader<R: BufRead + Send + 'static>(reader: R) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stopped reading stdin");
                    break;
                }
            }
        }
    });
    rx
}

async fn drive<L: Launch>(
    scheduler: &mut RefreshScheduler<L>,
    sink: &mut dyn DisplaySink,
    mut input: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) {
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input_open = true;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                scheduler.tick(Local::now().naive_local(), sink);
            }
            line = input.recv(), if input_open => match line {
                Some(line) if line.trim() == "q" => break,
                Some(_) => {
                    scheduler.request_refresh();
                }
                None => input_open = false,
            },
            _ = &mut shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piclock_core::{ClockFace, EventRecord, FetchPaths, ScheduleConfig};
    use std::io::Cursor;

    struct NullSink;

    impl DisplaySink for NullSink {
        fn show_clock(&mut self, _face: &ClockFace) {}
        fn show_events(&mut self, _events: &[EventRecord]) {}
    }

    fn scheduler(dir: &std::path::Path) -> RefreshScheduler<FetchLauncher> {
        let paths = FetchPaths {
            data_dir: dir.to_path_buf(),
            events: dir.join("events.txt"),
            response: dir.join("response.edc"),
        };
        let launcher = FetchLauncher::new(&ClockConfig::default().fetch, paths.clone()).dry_run();
        RefreshScheduler::new(ScheduleConfig::default(), &paths, "expired", launcher).unwrap()
    }

    #[tokio::test]
    async fn shutdown_does_not_wait_for_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler = scheduler(dir.path());
        // Sender kept alive: input stays open with nothing to read
        let (_tx, rx) = mpsc::channel(1);

        let stopped = time::timeout(
            Duration::from_secs(5),
            drive(&mut scheduler, &mut NullSink, rx, async {}),
        )
        .await;

        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn q_quits_and_other_lines_request_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler = scheduler(dir.path());
        let rx = spawn_line_reader(Cursor::new("\nq\n"));

        let stopped = time::timeout(
            Duration::from_secs(5),
            drive(&mut scheduler, &mut NullSink, rx, std::future::pending()),
        )
        .await;

        assert!(stopped.is_ok());
        // Startup delay would leave it far higher; a tick may land after the blank line
        assert!(scheduler.countdown() <= ScheduleConfig::default().pre_fire_offset + 1);
    }

    #[tokio::test]
    async fn reader_closes_channel_at_eof() {
        let mut rx = spawn_line_reader(Cursor::new("one\ntwo\n"));
        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.as_deref(), Some("two"));
        assert_eq!(rx.recv().await, None);
    }
}
