use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{FetchRequest, SuggestionEvent};
use crate::config::SuggestConfig;
use crate::geocoder::Geocoder;

/// Delays suggestion fetches and cancels the pending one when newer input arrives.
///
/// At most one fetch task is alive at a time. Outcomes are delivered on the
/// receiver returned by [`SuggestionDebouncer::new`].
pub struct SuggestionDebouncer {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    events: UnboundedSender<SuggestionEvent>,
    pending: Option<JoinHandle<()>>,
}

impl SuggestionDebouncer {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        delay: Duration,
    ) -> (Self, UnboundedReceiver<SuggestionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            geocoder,
            delay,
            events,
            pending: None,
        };
        (debouncer, receiver)
    }

    /// Debouncer with the delay from the `[suggest]` config section
    pub fn with_config(
        geocoder: Arc<dyn Geocoder>,
        config: &SuggestConfig,
    ) -> (Self, UnboundedReceiver<SuggestionEvent>) {
        Self::new(geocoder, config.debounce())
    }

    /// Schedule a fetch, aborting whichever one is still pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, request: FetchRequest) {
        self.cancel();

        let geocoder = Arc::clone(&self.geocoder);
        let events = self.events.clone();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let FetchRequest {
                generation,
                city,
                query,
            } = request;
            // Receiver gone means nobody cares about the outcome
            if events.send(SuggestionEvent::Started { generation }).is_err() {
                return;
            }

            let event = match geocoder.suggest(city, &query).await {
                Ok(suggestions) => SuggestionEvent::Loaded {
                    generation,
                    suggestions,
                },
                Err(e) => SuggestionEvent::Failed {
                    generation,
                    error: e.to_string(),
                },
            };
            let _ = events.send(event);
        }));
    }

    /// Abort the pending fetch, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("Cancelling superseded suggestion fetch");
            }
            handle.abort();
        }
    }
}

impl Drop for SuggestionDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuggestConfig;
    use crate::geocoder::{GeocodeError, StaticGeocoder};
    use crate::models::{AddressSuggestion, City, Coordinate};
    use crate::session::CheckSession;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and echoes the query back as a single suggestion
    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    impl Geocoder for CountingGeocoder {
        fn suggest<'a>(
            &'a self,
            _city: City,
            query: &'a str,
        ) -> BoxFuture<'a, Result<Vec<AddressSuggestion>, GeocodeError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let suggestion = AddressSuggestion::new(query, Coordinate::new(55.75, 37.61));
            async move { Ok(vec![suggestion]) }.boxed()
        }
    }

    struct FailingGeocoder;

    impl Geocoder for FailingGeocoder {
        fn suggest<'a>(
            &'a self,
            _city: City,
            _query: &'a str,
        ) -> BoxFuture<'a, Result<Vec<AddressSuggestion>, GeocodeError>> {
            async move { Err(GeocodeError::MissingApiKey) }.boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_input_supersedes_pending_fetch() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let (mut debouncer, mut events) =
            SuggestionDebouncer::new(geocoder.clone(), Duration::from_millis(300));
        let mut session = CheckSession::new(City::Moscow, &SuggestConfig::default());

        let first = session.on_query_changed("Тве").unwrap();
        debouncer.submit(first);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = session.on_query_changed("Тверская").unwrap();
        debouncer.submit(second.clone());

        let started = events.recv().await.unwrap();
        assert_eq!(
            started,
            SuggestionEvent::Started {
                generation: second.generation
            }
        );
        assert!(session.apply(started));

        let loaded = events.recv().await.unwrap();
        assert!(session.apply(loaded));
        assert_eq!(session.suggestions()[0].name, "Тверская");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_delay() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let (mut debouncer, mut events) =
            SuggestionDebouncer::new(geocoder.clone(), Duration::from_millis(300));

        debouncer.submit(FetchRequest {
            generation: 1,
            city: City::Moscow,
            query: "Арбат".to_string(),
        });
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);

        assert!(matches!(
            events.recv().await,
            Some(SuggestionEvent::Started { generation: 1 })
        ));
        assert!(matches!(
            events.recv().await,
            Some(SuggestionEvent::Loaded { generation: 1, .. })
        ));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delay_is_used() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let config = SuggestConfig {
            debounce_ms: 500,
            ..SuggestConfig::default()
        };
        let (mut debouncer, mut events) =
            SuggestionDebouncer::with_config(geocoder.clone(), &config);
        let mut session = CheckSession::new(City::Moscow, &config);

        let start = tokio::time::Instant::now();
        debouncer.submit(session.on_query_changed("Арбат").unwrap());
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);

        assert!(session.apply(events.recv().await.unwrap()));
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(session.apply(events.recv().await.unwrap()));
        assert_eq!(session.suggestions()[0].name, "Арбат");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_fetch() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let (mut debouncer, mut events) =
            SuggestionDebouncer::new(geocoder.clone(), Duration::from_millis(300));

        debouncer.submit(FetchRequest {
            generation: 1,
            city: City::Moscow,
            query: "Арбат".to_string(),
        });
        debouncer.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(events.try_recv().is_err());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported() {
        let (mut debouncer, mut events) =
            SuggestionDebouncer::new(Arc::new(FailingGeocoder), Duration::from_millis(300));

        debouncer.submit(FetchRequest {
            generation: 7,
            city: City::SaintPetersburg,
            query: "Невский".to_string(),
        });

        assert!(matches!(
            events.recv().await,
            Some(SuggestionEvent::Started { generation: 7 })
        ));
        assert!(matches!(
            events.recv().await,
            Some(SuggestionEvent::Failed { generation: 7, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_geocoder_end_to_end() {
        let geocoder = StaticGeocoder::new(5).with_address(
            City::SaintPetersburg,
            AddressSuggestion::new(
                "Санкт-Петербург, Невский проспект, 1",
                Coordinate::new(59.936, 30.315),
            ),
        );
        let (mut debouncer, mut events) =
            SuggestionDebouncer::new(Arc::new(geocoder), Duration::from_millis(300));
        let mut session = CheckSession::new(City::SaintPetersburg, &SuggestConfig::default());

        let request = session.on_query_changed("невский").unwrap();
        debouncer.submit(request);
        while session.suggestions().is_empty() {
            let event = events.recv().await.unwrap();
            session.apply(event);
        }

        let engine = crate::zone::ContainmentEngine::default();
        assert_eq!(session.on_suggestion_selected(0, &engine), Some(true));
        assert!(session.confirm().is_some());
    }
}
