// Server-sent event stream of sensor update notifications
use crate::application::update_service::SensorsUpdated;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::{self, error::RecvError};

pub const UPDATE_EVENT: &str = "linky_update";

fn update_event() -> Event {
    Event::default().event(UPDATE_EVENT).data("{}")
}

/// Forward every notification from `rx` as one `linky_update` event
pub fn stream_from_receiver(
    mut rx: broadcast::Receiver<SensorsUpdated>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(SensorsUpdated) => {
                    yield Ok::<_, Infallible>(update_event());
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Collapsed notifications still mean "something changed"
                    tracing::warn!(skipped, "Event subscriber lagging behind");
                    yield Ok::<_, Infallible>(update_event());
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
