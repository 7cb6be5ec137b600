//! NDJSON framing for the location stream.
//!
//! The stream body is one JSON object per line. Chunk boundaries fall
//! anywhere, so a small framer reassembles lines before parsing; a
//! malformed line is logged and skipped, never ending the stream.

use std::collections::VecDeque;
use std::fmt::Display;

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::detector::LocationSample;

use super::dto::LocationSampleDto;

/// Reassembles newline-delimited frames from arbitrary chunks.
#[derive(Default)]
struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    /// Feed a chunk; returns every line completed by it.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=newline).collect();
            line.pop(); // the newline itself
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// The unterminated tail once the body ends, if any.
    fn take_tail(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            let tail = std::mem::take(&mut self.buf);
            Some(String::from_utf8_lossy(&tail).into_owned())
        }
    }
}

/// Parse one frame. Blank lines and garbage both come back as `None`;
/// garbage is logged so a misbehaving client is visible.
fn parse_line(line: &str) -> Option<LocationSample> {
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<LocationSampleDto>(line) {
        Ok(dto) => match dto.into_domain() {
            Some(sample) => Some(sample),
            None => {
                warn!(line, "location sample with unrepresentable timestamp; skipped");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "malformed location line; skipped");
            None
        }
    }
}

struct FramerState<B> {
    body: B,
    framer: LineFramer,
    pending: VecDeque<LocationSample>,
    done: bool,
}

/// Adapt a chunked NDJSON body into a stream of location samples.
///
/// The adapted stream ends when the body does, or on a body read error
/// (logged; any partial trailing line is discarded with it).
pub fn location_samples<B, E>(body: B) -> impl Stream<Item = LocationSample>
where
    B: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let state = FramerState {
        body,
        framer: LineFramer::default(),
        pending: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(sample) = state.pending.pop_front() {
                return Some((sample, state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for line in state.framer.push(&chunk) {
                        state.pending.extend(parse_line(&line));
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "location stream body error; closing stream");
                    state.done = true;
                }
                None => {
                    state.done = true;
                    if let Some(tail) = state.framer.take_tail() {
                        state.pending.extend(parse_line(&tail));
                    }
                }
            }
        }
    })
}
