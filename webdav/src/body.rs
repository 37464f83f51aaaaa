// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request bodies that can be sent twice.
//!
//! A request may have to be replayed once after an authentication challenge.
//! In-memory bodies are shared between both attempts. Streams are teed: each
//! chunk pulled by the transport is captured, and the replay yields the
//! captured chunks followed by whatever the source has not produced yet.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Body of a `PUT` request.
pub enum RequestBody {
    /// Bytes held in memory.
    Bytes(Bytes),
    /// Chunks produced on demand.
    Stream(BoxStream<'static, io::Result<Bytes>>),
}

impl RequestBody {
    /// Streams the body from an async reader.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::Stream(ReaderStream::new(reader).boxed())
    }

    /// Wraps a stream of chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self::Stream(stream.boxed())
    }

    /// The complete body, if it is held in memory.
    pub(crate) const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Stream(_) => None,
        }
    }

    /// Splits the body into the view sent now and, when `replayable`, the
    /// view kept for a second attempt.
    ///
    /// Without a replay streams are handed to the transport as they are, so
    /// nothing is captured.
    pub(crate) fn tee(self, replayable: bool) -> (reqwest::Body, Option<ReplayBody>) {
        match self {
            Self::Bytes(bytes) => {
                let replay = replayable.then(|| ReplayBody::Buffered(bytes.clone()));
                (reqwest::Body::from(bytes), replay)
            }
            Self::Stream(source) if !replayable => (reqwest::Body::wrap_stream(source), None),
            Self::Stream(source) => {
                let state = Arc::new(Mutex::new(TeeState {
                    captured: Vec::new(),
                    source: Some(source),
                }));
                let first = TeeStream {
                    state: Arc::clone(&state),
                };
                (reqwest::Body::wrap_stream(first), Some(ReplayBody::Teed(state)))
            }
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Bytes(Bytes::from(text))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<&'static [u8]> for RequestBody {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(bytes))
    }
}

/// The retained view of a request body.
pub(crate) enum ReplayBody {
    Buffered(Bytes),
    Teed(Arc<Mutex<TeeState>>),
}

pub(crate) struct TeeState {
    captured: Vec<Bytes>,
    source: Option<BoxStream<'static, io::Result<Bytes>>>,
}

impl ReplayBody {
    /// Turns the retained view into a body for the second attempt.
    ///
    /// The source is taken away from the first attempt, which ends its stream
    /// if the transport is still polling it.
    pub(crate) fn into_body(self) -> reqwest::Body {
        match self {
            Self::Buffered(bytes) => reqwest::Body::from(bytes),
            Self::Teed(state) => reqwest::Body::wrap_stream(replay_stream(&state)),
        }
    }
}

fn replay_stream(state: &Mutex<TeeState>) -> BoxStream<'static, io::Result<Bytes>> {
    let (captured, source) = {
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        (std::mem::take(&mut state.captured), state.source.take())
    };

    let captured = stream::iter(captured.into_iter().map(Ok));
    match source {
        Some(source) => captured.chain(source).boxed(),
        None => captured.boxed(),
    }
}

/// First-attempt view of a teed stream.
struct TeeStream {
    state: Arc<Mutex<TeeState>>,
}

impl Stream for TeeStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let TeeState { captured, source } = &mut *state;
        let Some(inner) = source.as_mut() else {
            return Poll::Ready(None);
        };

        let polled = inner.poll_next_unpin(cx);
        match &polled {
            Poll::Ready(Some(Ok(chunk))) => captured.push(chunk.clone()),
            // Exhausted: the replay needs the captured chunks only.
            Poll::Ready(None) => *source = None,
            _ => {}
        }
        polled
    }
}
