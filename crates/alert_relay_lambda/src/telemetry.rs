use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// JSON log lines with no ANSI colouring, module target or timestamp;
/// CloudWatch records its own ingestion time.
pub fn json_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .finish()
}

/// Installs the stdout subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(json_subscriber(filter, std::io::stdout))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use super::*;

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for BufferWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("poisoned mutex").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(filter: &str, emit: impl FnOnce()) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer_buffer = Arc::clone(&buffer);
        let subscriber = json_subscriber(EnvFilter::new(filter), move || {
            BufferWriter(Arc::clone(&writer_buffer))
        });

        tracing::subscriber::with_default(subscriber, emit);

        let bytes = buffer.lock().expect("poisoned mutex").clone();
        String::from_utf8(bytes).expect("log output is UTF-8")
    }

    #[test]
    fn writes_plain_json_lines_without_time_or_target() {
        let output = capture("info", || {
            tracing::warn!(component = "alert_pipeline", event = "sample", "hello");
        });

        assert!(!output.contains('\u{1b}'), "{output}");
        let line: Value = serde_json::from_str(output.lines().next().expect("one log line"))
            .expect("log line is JSON");
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["fields"]["event"], "sample");
        assert_eq!(line["fields"]["message"], "hello");
        assert!(line.get("timestamp").is_none());
        assert!(line.get("target").is_none());
    }

    #[test]
    fn filter_drops_events_below_level() {
        let output = capture("warn", || {
            tracing::info!(event = "ignored");
        });

        assert!(output.is_empty(), "{output}");
    }
}
