// src/exec/stream.rs

//! Line pumps for the child's stdout and stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::launch::OutputCapture;
use crate::redact::SecureLineWriter;
use crate::types::OutputStream;

/// Spawn a task forwarding every line of `pipe` until EOF.
///
/// Each line goes to `capture` unredacted, then through `writer`. Lines are
/// decoded as UTF-8 with invalid sequences replaced, and lose their trailing
/// `\n` / `\r\n`. Order is preserved within one pipe only.
pub fn spawn_line_pump<R>(
    pipe: R,
    stream: OutputStream,
    writer: Arc<SecureLineWriter>,
    capture: Option<OutputCapture>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(trim_line_ending(&buf));
                    if let Some(capture) = &capture {
                        capture(&line);
                    }
                    trace!(%stream, line = %writer.redactor().redact(&line), "child output");
                    writer.write_line(&line, stream);
                }
                Err(e) => {
                    debug!(%stream, error = %e, "reading child output failed");
                    break;
                }
            }
        }

        debug!(%stream, "output pump ended");
    })
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::context::ExecutionContext;
    use crate::redact::Redactor;

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl ExecutionContext for Lines {
        fn write_line(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
        fn set_error_color(&self) {}
        fn reset_color(&self) {}
    }

    #[test]
    fn line_endings_are_trimmed() {
        assert_eq!(trim_line_ending(b"a\r\n"), b"a");
        assert_eq!(trim_line_ending(b"a\n"), b"a");
        assert_eq!(trim_line_ending(b"a"), b"a");
        assert_eq!(trim_line_ending(b"a\r"), b"a");
    }

    #[tokio::test]
    async fn pump_forwards_raw_to_capture_and_redacted_to_context() {
        let ctx = Arc::new(Lines::default());
        let writer = Arc::new(SecureLineWriter::new(
            ctx.clone(),
            Arc::new(Redactor::new(["pw"])),
        ));
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let capture: OutputCapture = Arc::new(move |line: &str| {
            sink.lock().unwrap().push(line.to_string());
        });

        let input: &[u8] = b"first pw\r\nsecond\n\xffbad\nlast";
        spawn_line_pump(input, OutputStream::Stdout, writer, Some(capture))
            .await
            .unwrap();

        assert_eq!(
            *captured.lock().unwrap(),
            vec!["first pw", "second", "\u{fffd}bad", "last"]
        );
        assert_eq!(
            *ctx.0.lock().unwrap(),
            vec!["first *********", "second", "\u{fffd}bad", "last"]
        );
    }
}
