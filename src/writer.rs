//! The response-writer capability services write into.
//!
//! A [`Service`](crate::Service) does not return a response; it writes one.
//! That indirection is what lets middleware sit between a service and the
//! client and observe what was written (see
//! [`StatusRecorder`](crate::middleware::StatusRecorder)).
//!
//! The server's own writer streams: the response head goes to hyper on the
//! first body write (or when the service returns), and every body chunk is
//! forwarded as soon as it is written.

use std::convert::Infallible;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body::{Body, Frame};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Minimal response surface: status, header fields, body bytes.
///
/// Writing body bytes without ever writing a status sends `200 OK`, as with
/// any HTTP server. Calls after the head has been sent cannot change it.
pub trait ResponseWriter: Send {
    fn write_status(&mut self, status: StatusCode);
    fn write_header(&mut self, name: HeaderName, value: HeaderValue);
    fn write_body(&mut self, chunk: &[u8]);
}

// ── Host writer ───────────────────────────────────────────────────────────────

/// The writer the server hands to the top-level service for each request.
pub(crate) struct HttpWriter {
    head: Option<oneshot::Sender<http::response::Parts>>,
    status: StatusCode,
    headers: HeaderMap,
    body: mpsc::UnboundedSender<Bytes>,
}

impl HttpWriter {
    /// Returns the writer, a receiver for the committed head, and the body
    /// that will yield every chunk written.
    pub(crate) fn channel() -> (Self, oneshot::Receiver<http::response::Parts>, ChannelBody) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::unbounded_channel();
        let writer = Self {
            head: Some(head_tx),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body_tx,
        };
        (writer, head_rx, ChannelBody { rx: body_rx })
    }

    /// Sends the head if nothing has been sent yet. Dropping the writer
    /// afterwards ends the body.
    pub(crate) fn finish(mut self) {
        self.commit();
    }

    fn commit(&mut self) {
        let Some(tx) = self.head.take() else { return };
        let mut res = http::Response::new(());
        *res.status_mut() = self.status;
        *res.headers_mut() = mem::take(&mut self.headers);
        let (parts, ()) = res.into_parts();
        // The receiver is gone only if the connection was dropped.
        let _ = tx.send(parts);
    }

    fn committed(&self) -> bool {
        self.head.is_none()
    }
}

impl ResponseWriter for HttpWriter {
    fn write_status(&mut self, status: StatusCode) {
        if self.committed() {
            warn!(status = status.as_u16(), "status written after response head was sent; ignored");
            return;
        }
        self.status = status;
    }

    fn write_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.committed() {
            warn!(header = %name, "header written after response head was sent; ignored");
            return;
        }
        self.headers.append(name, value);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.commit();
        if !chunk.is_empty() {
            let _ = self.body.send(Bytes::copy_from_slice(chunk));
        }
    }
}

// ── Streaming body ────────────────────────────────────────────────────────────

/// Response body fed by an [`HttpWriter`]; ends when the writer is dropped.
pub(crate) struct ChannelBody {
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl ChannelBody {
    pub(crate) fn empty() -> Self {
        let (_, rx) = mpsc::unbounded_channel();
        Self { rx }
    }
}

impl Body for ChannelBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        self.get_mut().rx.poll_recv(cx).map(|chunk| chunk.map(|b| Ok(Frame::data(b))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn body_write_without_status_sends_200() {
        let (mut w, head, body) = HttpWriter::channel();
        w.write_body(b"hello");
        w.finish();

        assert_eq!(head.await.unwrap().status, StatusCode::OK);
        assert_eq!(body.collect().await.unwrap().to_bytes(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn last_status_before_commit_is_sent() {
        let (mut w, head, _body) = HttpWriter::channel();
        w.write_status(StatusCode::ACCEPTED);
        w.write_status(StatusCode::CREATED);
        w.write_header(HeaderName::from_static("location"), HeaderValue::from_static("/u/1"));
        w.finish();

        let parts = head.await.unwrap();
        assert_eq!(parts.status, StatusCode::CREATED);
        assert_eq!(parts.headers["location"], "/u/1");
    }

    #[tokio::test]
    async fn status_after_first_body_write_is_ignored() {
        let (mut w, head, body) = HttpWriter::channel();
        w.write_body(b"a");
        w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        w.write_body(b"b");
        w.finish();

        assert_eq!(head.await.unwrap().status, StatusCode::OK);
        assert_eq!(body.collect().await.unwrap().to_bytes(), Bytes::from_static(b"ab"));
    }

    #[tokio::test]
    async fn empty_body_ends_immediately() {
        let bytes = ChannelBody::empty().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
