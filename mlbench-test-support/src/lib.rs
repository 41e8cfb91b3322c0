//! Shared test utilities used across mlbench crates.

pub mod tracing {
    //! A `tracing` layer that records closed spans and emitted events so tests
    //! can assert on benchmark instrumentation.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    /// Collects spans in completion order and events in emission order.
    ///
    /// Clones share storage, so a clone can be handed to a subscriber while
    /// this handle is kept for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Runs `f` with a fresh layer installed as the thread's default
        /// subscriber and returns its result together with the layer.
        ///
        /// # Examples
        /// ```
        /// use mlbench_test_support::tracing::RecordingLayer;
        ///
        /// let (value, layer) = RecordingLayer::capture(|| {
        ///     tracing::info_span!("outer").in_scope(|| tracing::info!("inside"));
        ///     3
        /// });
        /// assert_eq!(value, 3);
        /// assert!(layer.span("outer").is_some());
        /// assert!(layer.has_event(tracing::Level::INFO, "inside"));
        /// ```
        pub fn capture<F, R>(f: F) -> (R, Self)
        where
            F: FnOnce() -> R,
        {
            let layer = Self::default();
            let subscriber = tracing_subscriber::registry().with(layer.clone());
            let result = tracing::subscriber::with_default(subscriber, f);
            (result, layer)
        }

        /// Snapshot of the closed spans.
        ///
        /// # Examples
        /// ```
        /// use mlbench_test_support::tracing::RecordingLayer;
        ///
        /// assert!(RecordingLayer::default().spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Snapshot of the emitted events.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// First closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<SpanRecord> {
            self.spans().into_iter().find(|span| span.name == name)
        }

        /// Names of the closed spans in completion order.
        #[must_use]
        pub fn span_names(&self) -> Vec<String> {
            self.spans().into_iter().map(|span| span.name).collect()
        }

        /// Whether an event at `level` carried `message`.
        #[must_use]
        pub fn has_event(&self, level: Level, message: &str) -> bool {
            self.events()
                .iter()
                .any(|event| event.level == level && event.message() == Some(message))
        }
    }

    /// A closed span's name and fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from its metadata.
        pub name: String,
        /// Fields recorded at creation or later via `record`.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Value recorded for `name`, rendered as a string.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// An emitted event's level, target, and fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Module path or explicit target.
        pub target: String,
        /// Structured fields, including `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// The event's message, when it has one.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.field("message")
        }

        /// Value recorded for `name`, rendered as a string.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    struct OpenSpan(SpanRecord);

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut record = SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldCollector(&mut record.fields));
            span.extensions_mut().insert(OpenSpan(record));
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(OpenSpan(record)) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut FieldCollector(&mut record.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(OpenSpan(record)) = span.extensions_mut().remove::<OpenSpan>() else {
                return;
            };
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record);
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldCollector(&mut fields));
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(EventRecord {
                    level: *event.metadata().level(),
                    target: event.metadata().target().to_owned(),
                    fields,
                });
        }
    }

    struct FieldCollector<'a>(&'a mut HashMap<String, String>);

    impl FieldCollector<'_> {
        fn insert(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    impl Visit for FieldCollector<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.insert(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.insert(field, value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.insert(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.insert(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.insert(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.insert(field, value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.insert(field, value.to_string());
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use rstest::rstest;

        #[rstest]
        fn records_span_fields_including_late_ones() {
            let ((), layer) = RecordingLayer::capture(|| {
                let span = tracing::info_span!("work", rows = 3_u64, kind = "svm", done = tracing::field::Empty);
                span.record("done", true);
                drop(span);
            });
            let span = layer.span("work").expect("span must be recorded");
            assert_eq!(span.field("rows"), Some("3"));
            assert_eq!(span.field("kind"), Some("svm"));
            assert_eq!(span.field("done"), Some("true"));
        }

        #[rstest]
        fn records_events_with_levels() {
            let ((), layer) = RecordingLayer::capture(|| {
                tracing::warn!(seconds = 1.5_f64, "slow phase");
            });
            let events = layer.events();
            let event = events.first().expect("event must be recorded");
            assert_eq!(event.level, Level::WARN);
            assert_eq!(event.field("seconds"), Some("1.5"));
            assert!(layer.has_event(Level::WARN, "slow phase"));
            assert!(!layer.has_event(Level::INFO, "slow phase"));
        }

        #[rstest]
        fn spans_close_innermost_first() {
            let ((), layer) = RecordingLayer::capture(|| {
                tracing::info_span!("outer").in_scope(|| {
                    tracing::info_span!("inner").in_scope(|| {});
                });
            });
            assert_eq!(layer.span_names(), vec!["inner".to_owned(), "outer".to_owned()]);
        }
    }
}
