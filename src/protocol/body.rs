//! Bounded body reads that leave the body intact for downstream handlers.
//!
//! Only the first [`MAX_BODY_SIZE`] bytes are hashed. The validator reads at
//! most that much (rounded up to the frame boundary) and hands downstream a
//! [`RestoredBody`] that replays the buffered prefix before continuing with
//! the untouched remainder of the original stream.

use crate::SigwardenError;
use bytes::{Bytes, BytesMut};
use http::HeaderMap;
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use pin_project_lite::pin_project;
use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Number of body bytes covered by the signature check.
///
/// Bytes past the cap are ignored for hashing, not rejected. Signers and
/// validators must agree on this value.
pub const MAX_BODY_SIZE: usize = 2 * 1024;

pin_project! {
    /// Request body as seen by handlers after validation.
    #[derive(Debug)]
    pub struct RestoredBody<B> {
        prefix: Option<Bytes>,
        trailers: Option<HeaderMap>,
        #[pin]
        rest: Option<B>,
    }
}

impl<B> RestoredBody<B> {
    /// Wrap a body that was never read.
    pub fn untouched(body: B) -> Self {
        Self {
            prefix: None,
            trailers: None,
            rest: Some(body),
        }
    }

    fn new(prefix: Bytes, trailers: Option<HeaderMap>, rest: Option<B>) -> Self {
        Self {
            prefix: Some(prefix),
            trailers,
            rest,
        }
    }
}

impl<B> Body for RestoredBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();

        if let Some(prefix) = this.prefix.take() {
            if !prefix.is_empty() {
                return Poll::Ready(Some(Ok(Frame::data(prefix))));
            }
        }

        if let Some(rest) = this.rest.as_mut().as_pin_mut() {
            match ready!(rest.poll_frame(cx)) {
                Some(frame) => return Poll::Ready(Some(frame)),
                None => this.rest.set(None),
            }
        }

        Poll::Ready(this.trailers.take().map(|t| Ok(Frame::trailers(t))))
    }

    fn is_end_stream(&self) -> bool {
        self.prefix.as_ref().map_or(true, Bytes::is_empty)
            && self.trailers.is_none()
            && self.rest.as_ref().map_or(true, Body::is_end_stream)
    }

    fn size_hint(&self) -> SizeHint {
        let prefix = self.prefix.as_ref().map_or(0, |p| p.len() as u64);
        let mut hint = self
            .rest
            .as_ref()
            .map_or_else(|| SizeHint::with_exact(0), Body::size_hint);

        // Raise upper before lower so the lower <= upper assertion holds
        if let Some(upper) = hint.upper() {
            hint.set_upper(upper + prefix);
        }
        hint.set_lower(hint.lower() + prefix);
        hint
    }
}

/// Read at most `cap` bytes of `body` for hashing.
///
/// Always returns the restored body, even on failure, so the request can be
/// reassembled for whoever handles the rejection.
pub async fn read_capped<B>(
    mut body: B,
    cap: usize,
) -> (RestoredBody<B>, Result<Bytes, SigwardenError>)
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: fmt::Display,
{
    let mut buf = BytesMut::new();
    let mut trailers = None;
    let mut ended = false;

    while buf.len() < cap {
        match body.frame().await {
            None => {
                ended = true;
                break;
            }
            Some(Ok(frame)) => match frame.into_data() {
                Ok(data) => buf.extend_from_slice(&data),
                Err(frame) => {
                    // Trailers are always the final frame
                    trailers = frame.into_trailers().ok();
                    ended = true;
                    break;
                }
            },
            Some(Err(e)) => {
                let err = SigwardenError::BodyRead(e.to_string());
                return (RestoredBody::new(buf.freeze(), None, Some(body)), Err(err));
            }
        }
    }

    let prefix = buf.freeze();
    let hashed = prefix.slice(..prefix.len().min(cap));
    let rest = if ended { None } else { Some(body) };
    (RestoredBody::new(prefix, trailers, rest), Ok(hashed))
}
