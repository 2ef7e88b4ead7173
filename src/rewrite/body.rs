//! Response body model and one-shot materialization.
//!
//! A body is either a single buffer or a sequence of fragments pulled from a
//! stream. A [`FragmentStream`] owns whatever resource produces its
//! fragments; dropping it releases that resource, and the optional release
//! hook runs exactly once from `Drop`, whichever path the drop happens on.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt, TryStreamExt};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while pulling a body fragment from the downstream handler.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read response body fragment: {0}")]
    Fragment(#[source] BoxError),
}

/// Payload of a [`ResponseEnvelope`](crate::rewrite::ResponseEnvelope).
pub enum ResponseBody {
    Buffered(Bytes),
    Sequenced(FragmentStream),
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            ResponseBody::Sequenced(_) => f.write_str("Sequenced(..)"),
        }
    }
}

impl ResponseBody {
    pub fn empty() -> Self {
        ResponseBody::Buffered(Bytes::new())
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        ResponseBody::Buffered(bytes)
    }
}

impl From<&'static str> for ResponseBody {
    fn from(text: &'static str) -> Self {
        ResponseBody::Buffered(Bytes::from_static(text.as_bytes()))
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Buffered(Bytes::from(text))
    }
}

/// Incrementally produced body with scoped release.
pub struct FragmentStream {
    inner: BoxStream<'static, Result<Bytes, BoxError>>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl FragmentStream {
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            inner: stream.map_err(Into::into).boxed(),
            on_release: None,
        }
    }

    /// Stream over already available fragments.
    pub fn from_fragments<I, B>(fragments: I) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: Send + 'static,
        B: Into<Bytes>,
    {
        Self::new(stream::iter(
            fragments.into_iter().map(|fragment| Ok::<_, BoxError>(fragment.into())),
        ))
    }

    /// Run `hook` when the stream is released.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }
}

impl Stream for FragmentStream {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for FragmentStream {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

/// Consume a body into one contiguous buffer.
///
/// Buffered bodies are returned as-is. Sequenced bodies are concatenated in
/// arrival order and released before returning, including when a fragment
/// fails; that failure is returned to the caller.
pub async fn materialize(body: ResponseBody) -> Result<Bytes, BodyError> {
    match body {
        ResponseBody::Buffered(bytes) => Ok(bytes),
        ResponseBody::Sequenced(mut fragments) => {
            let mut first: Option<Bytes> = None;
            let mut joined: Vec<u8> = Vec::new();

            while let Some(fragment) = fragments.next().await {
                let fragment = fragment.map_err(BodyError::Fragment)?;
                match first.take() {
                    None if joined.is_empty() => first = Some(fragment),
                    None => joined.extend_from_slice(&fragment),
                    Some(previous) => {
                        joined.reserve(previous.len() + fragment.len());
                        joined.extend_from_slice(&previous);
                        joined.extend_from_slice(&fragment);
                    }
                }
            }

            Ok(match first {
                Some(only) => only,
                None => Bytes::from(joined),
            })
        }
    }
}
