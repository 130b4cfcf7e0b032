// src/exec/output.rs

//! Capture of a child's stdout / stderr into memory.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::debug;

/// Background reader draining one pipe into a shared buffer.
///
/// The buffer is shared rather than returned by the reader task so that
/// whatever arrived before a kill can still be recovered when the reader has
/// to be abandoned (e.g. a grandchild keeps the pipe open).
pub(crate) struct OutputCapture {
    stream: &'static str,
    buf: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputCapture {
    pub(crate) fn spawn<R>(stream: &'static str, pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = pipe.map(|mut pipe| {
            let buf = Arc::clone(&buf);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => buf
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend_from_slice(&chunk[..n]),
                        Err(e) => {
                            debug!(stream, error = %e, "error reading child output");
                            break;
                        }
                    }
                }
            })
        });

        Self {
            stream,
            buf,
            handle,
        }
    }

    /// Wait up to `within` for the pipe to hit EOF, then return what was read.
    pub(crate) async fn finish(self, within: Duration) -> String {
        if let Some(mut handle) = self.handle {
            if tokio::time::timeout(within, &mut handle).await.is_err() {
                debug!(
                    stream = self.stream,
                    "output pipe still open after child exit; keeping partial output"
                );
                handle.abort();
            }
        }

        let bytes = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_everything_until_eof() {
        let data: &[u8] = b"line one\nline two\n";
        let capture = OutputCapture::spawn("stdout", Some(data));
        assert_eq!(
            capture.finish(Duration::from_secs(1)).await,
            "line one\nline two\n"
        );
    }

    #[tokio::test]
    async fn missing_pipe_yields_empty_output() {
        let capture = OutputCapture::spawn::<&[u8]>("stderr", None);
        assert_eq!(capture.finish(Duration::from_millis(10)).await, "");
    }

    #[tokio::test]
    async fn keeps_partial_output_when_pipe_never_closes() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let capture = OutputCapture::spawn("stdout", Some(reader));

        tokio::io::AsyncWriteExt::write_all(&mut writer, b"partial")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // `writer` stays alive, so the reader never sees EOF.
        let out = capture.finish(Duration::from_millis(50)).await;
        assert_eq!(out, "partial");
        drop(writer);
    }
}
