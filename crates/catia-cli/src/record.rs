//! Recording sessions driven by an interaction stream.
//!
//! Each appended log entry is written to the output as one notification
//! line (`{"actions":[...],"lastAction":"..."}`), followed at the end of
//! the stream by a [`Summary`] line.
//!
//! Replay mode takes time from the `at` field of each event. Live mode
//! reads the stream on a separate task and ticks the wait timer from the
//! wall clock.

use std::time::Duration;

use anyhow::{Context, Result};
use catia_core::error::ApiError;
use catia_core::options::CaptureOptions;
use catia_core::protocol::{EventLine, Notification};
use catia_core::recorder::Recorder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::lines::{is_too_large, read_line_bounded, skip_line, MAX_LINE_SIZE};

/// Wall-clock period of the live-mode wait ticker.
pub const LIVE_TICK: Duration = Duration::from_secs(1);

/// Buffered lines between the live reader task and the recorder.
const LINE_CHANNEL_CAPACITY: usize = 64;

/// Unique identifier for a recording session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final line of a recording.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub actions: Vec<String>,
}

/// Where the session clock comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    /// `at` fields in the stream.
    Stream,
    /// The caller's ticker.
    Wall,
}

/// A recorder wired to an output sink.
struct Recording<'a, W> {
    id: SessionId,
    started_at: DateTime<Utc>,
    recorder: Recorder,
    notifications: mpsc::UnboundedReceiver<String>,
    out: &'a mut W,
    line_no: usize,
    skipped: usize,
}

impl<'a, W: AsyncWrite + Unpin> Recording<'a, W> {
    fn start(options: CaptureOptions, out: &'a mut W) -> Self {
        let (tx, notifications) = mpsc::unbounded_channel();

        let mut recorder = Recorder::new(options);
        recorder.subscribe(move |notification: &Notification<'_>| {
            match serde_json::to_string(notification) {
                Ok(line) => {
                    // Receiver lives as long as the recording
                    let _ = tx.send(line);
                }
                Err(e) => warn!("Failed to serialize notification: {}", e),
            }
        });
        recorder.begin();

        let id = SessionId::new();
        info!("Recording session {}", id);

        Self {
            id,
            started_at: Utc::now(),
            recorder,
            notifications,
            out,
            line_no: 0,
            skipped: 0,
        }
    }

    /// Decode and handle one stream line. Malformed lines are skipped.
    async fn feed(&mut self, line: &str, clock: Clock) -> Result<()> {
        self.line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let event = match EventLine::parse(line, self.line_no) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping: {}", e);
                self.skipped += 1;
                return Ok(());
            }
        };

        if let (Clock::Stream, Some(at)) = (clock, event.at) {
            self.recorder.advance_to(at);
        }
        self.recorder.handle(&event.event);
        self.flush().await
    }

    /// Count a line dropped for exceeding the size limit.
    fn skip_oversized(&mut self, error: &anyhow::Error) {
        self.line_no += 1;
        self.skipped += 1;
        warn!("Skipping line {}: {}", self.line_no, error);
    }

    async fn tick(&mut self, elapsed: Duration) -> Result<()> {
        self.recorder.advance_to(millis(elapsed));
        self.flush().await
    }

    /// Write pending notifications.
    async fn flush(&mut self) -> Result<()> {
        let mut wrote = false;
        while let Ok(line) = self.notifications.try_recv() {
            write_line(self.out, &line).await?;
            wrote = true;
        }
        if wrote {
            self.out.flush().await.context("Failed to flush output")?;
        }
        Ok(())
    }

    async fn finish(mut self) -> Result<Summary> {
        self.flush().await?;
        if self.skipped > 0 {
            warn!("Skipped {} malformed line(s)", self.skipped);
        }

        let summary = Summary {
            session_id: self.id,
            started_at: self.started_at,
            actions: self.recorder.finish(),
        };
        let json = serde_json::to_string(&summary).context("Failed to serialize summary")?;
        write_line(self.out, &json).await?;
        self.out.flush().await.context("Failed to flush output")?;
        Ok(summary)
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, line: &str) -> Result<()> {
    out.write_all(line.as_bytes())
        .await
        .context("Failed to write output")?;
    out.write_all(b"\n")
        .await
        .context("Failed to write newline")?;
    Ok(())
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Record a captured stream, taking time from each event's `at` field.
pub async fn replay<R, W>(reader: &mut R, out: &mut W, options: CaptureOptions) -> Result<Summary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut recording = Recording::start(options, out);
    let mut line = String::new();

    loop {
        line.clear();
        match read_line_bounded(reader, &mut line, MAX_LINE_SIZE).await {
            Ok(0) => break,
            Ok(_) => recording.feed(&line, Clock::Stream).await?,
            Err(e) if is_too_large(&e) => {
                recording.skip_oversized(&e);
                skip_line(reader).await?;
            }
            Err(e) => return Err(e),
        }
    }

    recording.finish().await
}

/// Record a live stream, ticking the wait timer every `tick` of wall time.
pub async fn live<R, W>(
    reader: R,
    out: &mut W,
    options: CaptureOptions,
    tick: Duration,
) -> Result<Summary>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (line_tx, mut line_rx) = mpsc::channel::<Result<String>>(LINE_CHANNEL_CAPACITY);

    // Reading happens on its own task so a pending read is never cancelled
    // by the ticker.
    let reader_task = tokio::spawn(async move {
        let mut reader = reader;
        let mut line = String::new();
        loop {
            line.clear();
            match read_line_bounded(&mut reader, &mut line, MAX_LINE_SIZE).await {
                Ok(0) => break,
                Ok(_) => {
                    if line_tx.send(Ok(line.clone())).await.is_err() {
                        break;
                    }
                }
                Err(e) if is_too_large(&e) => {
                    let skipped = skip_line(&mut reader).await;
                    if line_tx.send(Err(e)).await.is_err() {
                        break;
                    }
                    if let Err(e) = skipped {
                        let _ = line_tx.send(Err(e)).await;
                        break;
                    }
                }
                Err(e) => {
                    let _ = line_tx.send(Err(e)).await;
                    break;
                }
            }
        }
        debug!("Input stream closed");
    });

    let start = Instant::now();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut recording = Recording::start(options, out);

    loop {
        tokio::select! {
            received = line_rx.recv() => match received {
                Some(Ok(line)) => {
                    recording.recorder.advance_to(millis(start.elapsed()));
                    recording.feed(&line, Clock::Wall).await?;
                }
                Some(Err(e)) if is_too_large(&e) => recording.skip_oversized(&e),
                Some(Err(e)) => return Err(e),
                None => break,
            },
            _ = ticker.tick() => recording.tick(start.elapsed()).await?,
        }
    }

    reader_task
        .await
        .map_err(|e| ApiError::internal(format!("Input reader task failed: {}", e)))?;
    recording.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    const STREAM: &str = r#"{"at":0,"event":"load","location":"http://example.com"}
{"at":100,"event":"click","target":{"name":"BUTTON","parentName":"FORM","attributes":{"id":"submit"}}}
"#;

    async fn replay_str(input: &str, options: CaptureOptions) -> (Summary, Vec<String>) {
        let mut reader = BufReader::new(std::io::Cursor::new(input.as_bytes().to_vec()));
        let mut out = Vec::new();
        let summary = replay(&mut reader, &mut out, options).await.expect("replay");
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (summary, lines)
    }

    #[tokio::test]
    async fn test_replay_writes_notifications_then_summary() {
        let (summary, lines) = replay_str(STREAM, CaptureOptions::default()).await;

        assert_eq!(
            summary.actions,
            vec!["visit http://example.com", "click $ #submit"]
        );
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["lastAction"], "visit http://example.com");
        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second["actions"].as_array().unwrap().len(), 2);

        let last: serde_json::Value = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(last["session_id"], summary.session_id.0.as_str());
        assert!(last["started_at"].is_string());
        assert_eq!(last["actions"][1], "click $ #submit");
    }

    #[tokio::test]
    async fn test_replay_skips_malformed_lines() {
        let input = format!("not json\n{{\"event\":\"teleport\"}}\n\n{}", STREAM);
        let (summary, lines) = replay_str(&input, CaptureOptions::default()).await;
        assert_eq!(summary.actions.len(), 2);
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn test_replay_uses_at_for_wait() {
        let input = r#"{"at":0,"event":"load","location":"http://a"}
{"at":2500,"event":"copy"}
"#;
        let options = CaptureOptions {
            show_wait: true,
            wait_timeout: 1000,
            ..CaptureOptions::default()
        };
        let (summary, _) = replay_str(input, options).await;
        assert_eq!(
            summary.actions,
            vec!["visit http://a", "wait 0", "wait 1", "copy"]
        );
    }

    #[tokio::test]
    async fn test_replay_empty_stream() {
        let (summary, lines) = replay_str("", CaptureOptions::default()).await;
        assert!(summary.actions.is_empty());
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_live_reads_until_eof() {
        let reader = BufReader::new(std::io::Cursor::new(STREAM.as_bytes().to_vec()));
        let mut out = Vec::new();
        let summary = live(reader, &mut out, CaptureOptions::default(), LIVE_TICK)
            .await
            .expect("live");
        assert_eq!(
            summary.actions,
            vec!["visit http://example.com", "click $ #submit"]
        );
    }

    #[tokio::test]
    async fn test_live_ticks_wait_from_wall_clock() {
        let (mut writer, reader) = tokio::io::duplex(1024);
        tokio::spawn(async move {
            writer
                .write_all(b"{\"event\":\"load\",\"location\":\"http://a\"}\n")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            drop(writer);
        });

        let options = CaptureOptions {
            show_wait: true,
            wait_timeout: 0,
            ..CaptureOptions::default()
        };
        let mut out = Vec::new();
        let summary = live(
            BufReader::new(reader),
            &mut out,
            options,
            Duration::from_millis(20),
        )
        .await
        .expect("live");

        assert_eq!(summary.actions[0], "visit http://a");
        assert!(summary.actions.contains(&"wait 0".to_string()));
    }

    fn oversized_then_stream() -> String {
        format!("{}\n{}", "x".repeat(MAX_LINE_SIZE + 1), STREAM)
    }

    #[tokio::test]
    async fn test_replay_skips_oversized_line() {
        let input = oversized_then_stream();
        let (summary, lines) = replay_str(&input, CaptureOptions::default()).await;
        assert_eq!(
            summary.actions,
            vec!["visit http://example.com", "click $ #submit"]
        );
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn test_live_skips_oversized_line() {
        let input = oversized_then_stream();
        let reader = BufReader::new(std::io::Cursor::new(input.into_bytes()));
        let mut out = Vec::new();
        let summary = live(reader, &mut out, CaptureOptions::default(), LIVE_TICK)
            .await
            .expect("live");
        assert_eq!(
            summary.actions,
            vec!["visit http://example.com", "click $ #submit"]
        );
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
