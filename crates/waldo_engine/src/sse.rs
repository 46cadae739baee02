use std::fmt::Display;

use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::{future, Stream, StreamExt};

use crate::{FailureKind, RequestError};

/// Decode a `text/event-stream` body into the `data` payload of each event.
///
/// Framing follows the event-stream format: LF, CRLF and CR line endings, a
/// leading byte-order mark, comments and multi-line `data` fields. Events
/// without data are skipped; the `event`, `id` and `retry` fields are ignored.
pub fn data_payloads<S, B, E>(body: S) -> impl Stream<Item = Result<String, RequestError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<RequestError> + Display + Send + 'static,
{
    body.eventsource().filter_map(|item| {
        future::ready(match item {
            Ok(event) if event.data.is_empty() => None,
            Ok(event) => Some(Ok(event.data)),
            Err(err) => Some(Err(stream_error(err))),
        })
    })
}

fn stream_error<E>(err: EventStreamError<E>) -> RequestError
where
    E: Into<RequestError> + Display,
{
    match err {
        EventStreamError::Transport(err) => err.into(),
        other => RequestError::new(FailureKind::Decode, other.to_string()),
    }
}
