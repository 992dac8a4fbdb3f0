//! Newline-delimited text connection.
//!
//! Wraps any byte stream in an [`AnyDelimiterCodec`] frame split on `\n`. Inbound lines are
//! decoded lossily: invalid UTF-8 sequences become U+FFFD and a trailing `\r` is dropped.
//! I/O errors and over-long lines surface as a [`ConnectionError`].

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Framed};

use crate::domain::ConnectionError;

type LineFramed<S> = Framed<S, AnyDelimiterCodec>;

const NEWLINE: &[u8] = b"\n";

impl From<AnyDelimiterCodecError> for ConnectionError {
    fn from(error: AnyDelimiterCodecError) -> Self {
        match error {
            AnyDelimiterCodecError::MaxChunkLengthExceeded => ConnectionError::LineTooLong,
            AnyDelimiterCodecError::Io(e) => ConnectionError::Disconnected(e.to_string()),
        }
    }
}

fn line_codec(max_length: Option<usize>) -> AnyDelimiterCodec {
    match max_length {
        Some(max_length) => {
            AnyDelimiterCodec::new_with_max_length(NEWLINE.to_vec(), NEWLINE.to_vec(), max_length)
        }
        None => AnyDelimiterCodec::new(NEWLINE.to_vec(), NEWLINE.to_vec()),
    }
}

fn decode_line(chunk: &[u8]) -> String {
    let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
    String::from_utf8_lossy(chunk).into_owned()
}

/// A stream read and written as discrete text lines.
pub struct LineConnection<S> {
    framed: LineFramed<S>,
}

impl<S> LineConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Lines of any length are accepted.
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, line_codec(None)),
        }
    }

    /// Inbound lines longer than `max_length` bytes fail with
    /// [`ConnectionError::LineTooLong`].
    pub fn with_max_length(stream: S, max_length: usize) -> Self {
        Self {
            framed: Framed::new(stream, line_codec(Some(max_length))),
        }
    }

    pub fn with_optional_limit(stream: S, max_length: Option<usize>) -> Self {
        match max_length {
            Some(max_length) => Self::with_max_length(stream, max_length),
            None => Self::new(stream),
        }
    }

    /// Read the next line. `Ok(None)` means the peer closed the stream.
    pub async fn read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        next_line(&mut self.framed).await
    }

    /// Split into independently owned write and read halves.
    pub fn split(self) -> (LineWriter<S>, LineReader<S>) {
        let (sink, stream) = self.framed.split();
        (LineWriter { sink }, LineReader { stream })
    }
}

async fn next_line<St, B>(stream: &mut St) -> Result<Option<String>, ConnectionError>
where
    St: futures_util::Stream<Item = Result<B, AnyDelimiterCodecError>> + Unpin,
    B: AsRef<[u8]>,
{
    match stream.next().await {
        Some(Ok(chunk)) => Ok(Some(decode_line(chunk.as_ref()))),
        Some(Err(e)) => Err(ConnectionError::from(e)),
        None => Ok(None),
    }
}

/// Read half of a [`LineConnection`].
pub struct LineReader<S> {
    stream: SplitStream<LineFramed<S>>,
}

impl<S> LineReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read the next line. `Ok(None)` means the peer closed the stream.
    pub async fn read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        next_line(&mut self.stream).await
    }
}

/// Write half of a [`LineConnection`].
pub struct LineWriter<S> {
    sink: SplitSink<LineFramed<S>, String>,
}

impl<S> LineWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn write_line(&mut self, line: String) -> Result<(), ConnectionError> {
        self.sink.send(line).await.map_err(ConnectionError::from)
    }

    /// Flush pending lines and shut down the write direction.
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        self.sink.close().await.map_err(ConnectionError::from)
    }
}
