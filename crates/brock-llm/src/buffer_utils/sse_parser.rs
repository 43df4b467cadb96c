use anyhow::Result;
use futures::{Stream, StreamExt};
use std::fmt::Display;

use super::buffering::CircularLineBuffer;
use crate::traits::EventStream;
use crate::StreamEvent;

/// Strategy pattern for parsing different SSE payload types
pub trait SseLineParser: Send {
    /// Parse a data line into stream events
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Generic SSE stream parser over a byte stream.
///
/// Only `data:` lines are interpreted; `event:`, `id:` and comment lines are
/// skipped. The stream ends at the done marker or when the body ends.
pub fn parse_sse_stream<S, B, E, P>(bytes: S, parser: P) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut finished = false;

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        let outcome = match line_result {
                            Ok(line) => parse_line(&parser, &line),
                            Err(e) => LineOutcome::Events(Err(e)),
                        };
                        match outcome {
                            LineOutcome::Skip => continue,
                            LineOutcome::Done => {
                                yield Ok(StreamEvent::Done { finish_reason: None });
                                finished = true;
                                break 'outer;
                            }
                            LineOutcome::Events(Ok(events)) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            LineOutcome::Events(Err(e)) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    finished = true;
                    break;
                }
            }
        }

        if !finished {
            if let Some(Ok(line)) = buffer.take_remaining() {
                let outcome = parse_line(&parser, &line);
                match outcome {
                    LineOutcome::Done => yield Ok(StreamEvent::Done { finish_reason: None }),
                    LineOutcome::Events(Ok(events)) => {
                        for event in events {
                            yield Ok(event);
                        }
                    }
                    LineOutcome::Events(Err(e)) => yield Err(e),
                    LineOutcome::Skip => {}
                }
            }
        }
    })
}

enum LineOutcome {
    Skip,
    Done,
    Events(Result<Vec<StreamEvent>>),
}

fn parse_line<P: SseLineParser>(parser: &P, line: &str) -> LineOutcome {
    let Some(data) = line.strip_prefix("data:") else {
        return LineOutcome::Skip;
    };
    let data = data.trim_start();
    if data.is_empty() {
        return LineOutcome::Skip;
    }
    if parser.is_done_marker(data) {
        return LineOutcome::Done;
    }
    LineOutcome::Events(parser.parse_data_line(data))
}
