//! SSE response stream for one subscriber

use std::convert::Infallible;

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::registry::SubscriptionGuard;
use super::sink::Frame;

struct StreamState {
    frames: mpsc::Receiver<Frame>,
    token: CancellationToken,
    _guard: SubscriptionGuard,
}

/// Turn a subscriber's frame channel into an SSE event stream
///
/// The stream ends when the subscriber's token is cancelled or the channel
/// closes. The guard lives inside the stream, so dropping the response (client
/// gone, write failed) unsubscribes.
pub fn subscriber_stream(
    frames: mpsc::Receiver<Frame>,
    token: CancellationToken,
    guard: SubscriptionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    let state = StreamState {
        frames,
        token,
        _guard: guard,
    };

    futures::stream::unfold(state, |mut state| async move {
        let next = tokio::select! {
            biased;
            _ = state.token.cancelled() => None,
            frame = state.frames.recv() => frame,
        };
        let frame = next?;
        Some((Ok(Event::default().data(&*frame)), state))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveOrderRegistry;
    use futures::StreamExt;
    use shared::LiveOrderEvent;
    use std::sync::Arc;

    #[tokio::test]
    async fn stream_yields_frames_then_ends_on_unsubscribe() {
        let registry = LiveOrderRegistry::new();
        let (tx, rx) = mpsc::channel::<Frame>(8);
        tx.try_send(Arc::from("{\"event\":\"connected\",\"ts\":1}"))
            .unwrap();
        let handle = registry.subscribe(tx);
        let guard = SubscriptionGuard::new(registry.clone(), handle.id());
        let mut stream = Box::pin(subscriber_stream(rx, handle.token().clone(), guard));

        assert!(stream.next().await.is_some());

        registry.publish(LiveOrderEvent::cancelled(3)).unwrap();
        assert!(stream.next().await.is_some());

        registry.unsubscribe(handle.id());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn dropping_stream_unsubscribes() {
        let registry = LiveOrderRegistry::new();
        let (tx, rx) = mpsc::channel::<Frame>(8);
        let handle = registry.subscribe(tx);
        let guard = SubscriptionGuard::new(registry.clone(), handle.id());
        let stream = subscriber_stream(rx, handle.token().clone(), guard);
        assert_eq!(registry.subscriber_count(), 1);

        drop(stream);
        assert_eq!(registry.subscriber_count(), 0);
    }
}
