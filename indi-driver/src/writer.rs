use crate::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// The outbound sink. One protocol message is one top-level element;
/// `emit` holds the sink lock for the whole write, so concurrent
/// emitters interleave only at element boundaries.
pub(crate) struct Writer {
    sink: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl Writer {
    pub(crate) fn new(
        sink: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Writer {
        Writer {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Writes one complete element and flushes it. A failure here
    /// means the peer link is gone; callers treat it as fatal.
    pub(crate) async fn emit(&self, element: &str) -> Result<()> {
        let mut sink = self.sink.lock().await;

        sink.write_all(element.as_bytes()).await?;
        sink.write_all(b"\n").await?;
        sink.flush().await?;
        Ok(())
    }
}

/// The timestamp attribute attached to outbound state changes and
/// messages.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_emit_appends_newline_and_flushes() {
        let (wr, mut rd) = tokio::io::duplex(4096);
        let writer = Writer::new(wr);

        writer.emit("<a/>").await.unwrap();
        writer.emit("<b>x</b>").await.unwrap();
        drop(writer);

        let mut out = String::new();

        rd.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "<a/>\n<b>x</b>\n");
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();

        // 2024-05-01T12:00:00
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
    }
}
