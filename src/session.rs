//! Drives one streaming exchange through the decode pipeline.
//!
//! A session is strictly sequential: each transport chunk is split into
//! lines, each line decoded, and each fragment handed to the consumer
//! before the next chunk is requested. Sessions share no mutable state,
//! so two chats in flight never interfere.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::client::ClientError;
use crate::sse::{decode_line, EventRecord, LineSplitter};

/// How a stream finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamEnd {
    /// The `[DONE]` sentinel was seen.
    Terminator,
    /// The transport closed cleanly without a sentinel. Treated as an
    /// implicit clean end, not an error.
    Eof,
}

/// Pump the byte stream through splitter and decoder, delivering each
/// fragment to `on_fragment` in arrival order.
///
/// Returns `Ok` on a terminator or a clean end of transport, `Err` on a
/// transport failure mid-stream; the caller decides whether to fall back.
/// The byte stream is dropped on every exit path, releasing the
/// connection, and is not read past the terminator. A partial line still
/// buffered when the transport closes is discarded.
pub(crate) async fn pump<S, F>(byte_stream: S, on_fragment: &mut F) -> Result<StreamEnd, ClientError>
where
    S: Stream<Item = Result<Bytes, ClientError>>,
    F: FnMut(&str),
{
    let mut byte_stream = std::pin::pin!(byte_stream);
    let mut splitter = LineSplitter::new();

    while let Some(chunk) = byte_stream.next().await {
        for line in splitter.feed(&chunk?) {
            match decode_line(&line) {
                EventRecord::Data(payload) => {
                    if let Some(fragment) = payload.delta_content() {
                        on_fragment(fragment);
                    }
                }
                EventRecord::Terminator => {
                    debug!("stream terminator received");
                    return Ok(StreamEnd::Terminator);
                }
                EventRecord::Ignorable => {}
            }
        }
    }

    debug!("transport closed without terminator");
    Ok(StreamEnd::Eof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    /// Run the pump over the body split into the given chunks and
    /// collect delivered fragments.
    async fn collect(chunks: Vec<&[u8]>) -> (Vec<String>, Result<StreamEnd, ClientError>) {
        let byte_stream = stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect::<Vec<Result<Bytes, ClientError>>>(),
        );
        let mut fragments = Vec::new();
        let end = pump(byte_stream, &mut |f: &str| fragments.push(f.to_string())).await;
        (fragments, end)
    }

    const BODY: &[u8] = b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\
        \n\
        data: {\"choices\":[{\"delta\":{\"content\":\"\xe5\x97\xaf\xef\xbc\x8c\"}}]}\n\
        \n\
        data:data: {\"choices\":[{\"delta\":{\"content\":\"hello\"}}]}\n\
        \n\
        data: {broken\n\
        \n\
        data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\
        \n\
        data: [DONE]\n";

    #[tokio::test]
    async fn fragments_are_chunk_boundary_independent() {
        let (whole, end) = collect(vec![BODY]).await;
        assert_eq!(whole, vec!["嗯，", "hello", " world"]);
        assert_eq!(end.unwrap(), StreamEnd::Terminator);

        // Byte-by-byte delivery, splitting every token and the multi-byte
        // characters, must produce the identical fragment sequence.
        let bytes: Vec<&[u8]> = BODY.chunks(1).collect();
        let (tiny, _) = collect(bytes).await;
        assert_eq!(tiny, whole);

        // And an arbitrary mid-size chunking.
        let chunked: Vec<&[u8]> = BODY.chunks(17).collect();
        let (mid, _) = collect(chunked).await;
        assert_eq!(mid, whole);
    }

    #[tokio::test]
    async fn eof_without_terminator_is_clean_end() {
        let (fragments, end) =
            collect(vec![b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n"]).await;
        assert_eq!(fragments, vec!["hi"]);
        assert_eq!(end.unwrap(), StreamEnd::Eof);
    }

    #[tokio::test]
    async fn trailing_partial_line_is_discarded() {
        let (fragments, end) = collect(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"dropped\"}}]}",
        ])
        .await;
        assert_eq!(fragments, vec!["hi"]);
        assert_eq!(end.unwrap(), StreamEnd::Eof);
    }

    #[tokio::test]
    async fn nothing_is_read_past_the_terminator() {
        let (fragments, end) = collect(vec![
            b"data: [DONE]\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        ])
        .await;
        assert!(fragments.is_empty());
        assert_eq!(end.unwrap(), StreamEnd::Terminator);
    }

    #[tokio::test]
    async fn transport_error_mid_stream_surfaces_after_delivered_fragments() {
        let byte_stream = stream::iter(vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n",
            )),
            Err(ClientError::Api("connection reset".to_string())),
        ]);
        let mut fragments = Vec::new();
        let end = pump(byte_stream, &mut |f: &str| fragments.push(f.to_string())).await;

        assert_eq!(fragments, vec!["hi"]);
        assert!(end.is_err());
    }

    #[tokio::test]
    async fn malformed_line_does_not_stop_the_session() {
        let (fragments, end) = collect(vec![
            b"data: {malformed\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\ndata: [DONE]\n",
        ])
        .await;
        assert_eq!(fragments, vec!["ok"]);
        assert_eq!(end.unwrap(), StreamEnd::Terminator);
    }
}
