//! Response status interception.

use http::StatusCode;
use http::header::{HeaderName, HeaderValue};

use crate::writer::ResponseWriter;

/// Forwards every write to the wrapped writer and remembers the last status.
///
/// Starts at `200 OK`, which is also what the wrapped writer sends when the
/// service writes a body without setting a status. The first body write fixes
/// the head, so statuses written after it are still forwarded but no longer
/// recorded; [`status`](Self::status) always names the code the client saw.
/// Bytes and headers pass through untouched and unbuffered.
pub struct StatusRecorder<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: StatusCode,
    head_sent: bool,
}

impl<'a> StatusRecorder<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, status: StatusCode::OK, head_sent: false }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ResponseWriter for StatusRecorder<'_> {
    fn write_status(&mut self, status: StatusCode) {
        if !self.head_sent {
            self.status = status;
        }
        self.inner.write_status(status);
    }

    fn write_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.write_header(name, value);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.head_sent = true;
        self.inner.write_body(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::CapturedWriter;

    #[test]
    fn body_only_records_default_200() {
        let mut w = CapturedWriter::default();
        let mut rec = StatusRecorder::new(&mut w);
        rec.write_body(b"hi");
        assert_eq!(rec.status(), StatusCode::OK);

        assert_eq!(w.sent_status(), Some(StatusCode::OK));
        assert!(w.statuses.is_empty());
    }

    #[test]
    fn untouched_recorder_reports_200() {
        let mut w = CapturedWriter::default();
        let rec = StatusRecorder::new(&mut w);
        assert_eq!(rec.status(), StatusCode::OK);
    }

    #[test]
    fn last_status_wins() {
        let mut w = CapturedWriter::default();
        let mut rec = StatusRecorder::new(&mut w);
        for code in [StatusCode::ACCEPTED, StatusCode::NOT_FOUND, StatusCode::CONFLICT] {
            rec.write_status(code);
        }
        assert_eq!(rec.status(), StatusCode::CONFLICT);

        assert_eq!(
            w.statuses,
            vec![StatusCode::ACCEPTED, StatusCode::NOT_FOUND, StatusCode::CONFLICT],
        );
    }

    #[test]
    fn status_after_body_matches_what_was_sent() {
        let mut w = CapturedWriter::default();
        let mut rec = StatusRecorder::new(&mut w);
        rec.write_body(b"a");
        rec.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rec.status(), StatusCode::OK);

        assert_eq!(w.sent_status(), Some(StatusCode::OK));
        assert_eq!(w.statuses, vec![StatusCode::INTERNAL_SERVER_ERROR]);
    }

    #[tokio::test]
    async fn agrees_with_the_server_writer_on_late_status() {
        let (mut w, head, _body) = crate::writer::HttpWriter::channel();
        let mut rec = StatusRecorder::new(&mut w);
        rec.write_status(StatusCode::CREATED);
        rec.write_body(b"a");
        rec.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        let recorded = rec.status();
        w.finish();

        assert_eq!(recorded, StatusCode::CREATED);
        assert_eq!(head.await.unwrap().status, recorded);
    }

    #[test]
    fn headers_and_body_pass_through_unchanged() {
        let mut w = CapturedWriter::default();
        let mut rec = StatusRecorder::new(&mut w);
        rec.write_status(StatusCode::CREATED);
        rec.write_header(HeaderName::from_static("location"), HeaderValue::from_static("/u/7"));
        rec.write_body(&[0, 159, 146, 150]);
        rec.write_body(b"tail");
        assert_eq!(rec.status(), StatusCode::CREATED);

        assert_eq!(w.sent_status(), Some(StatusCode::CREATED));
        assert_eq!(w.header_values("location"), vec!["/u/7"]);
        assert_eq!(w.body, [0, 159, 146, 150, b't', b'a', b'i', b'l']);
    }
}
