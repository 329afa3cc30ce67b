pub mod mock_media;

use mock_media::{mock_media_stack, MockFactory, MockHandles, MockMedia, RecordingSink};
use pairplay_p2p::{MediaConstraints, NegotiatorConfig, PeerConnectionNegotiator};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{span, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type TestNegotiator = PeerConnectionNegotiator<MockFactory, MockMedia, RecordingSink>;

/// Negotiator wired to mocks, plus the handles to inspect them
pub struct NegotiatorFixture {
    pub negotiator: TestNegotiator,
    pub mocks: MockHandles,
}

impl NegotiatorFixture {
    /// Devices grant video+audio
    pub fn new() -> Self {
        Self::with_media(vec![MediaConstraints::VIDEO_AUDIO, MediaConstraints::AUDIO_ONLY])
    }

    pub fn with_media(allowed: Vec<MediaConstraints>) -> Self {
        init_test_tracing();
        let (factory, media, sink, mocks) = mock_media_stack(allowed);
        let negotiator = PeerConnectionNegotiator::new(NegotiatorConfig::new(), factory, media, sink);
        Self { negotiator, mocks }
    }
}

fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("pairplay_p2p=debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// Layer that keeps the name and `id` field of every span opened
#[derive(Clone, Default)]
pub struct SpanRecorder(Arc<Mutex<Vec<(String, Option<String>)>>>);

impl SpanRecorder {
    pub fn spans(&self) -> Vec<(String, Option<String>)> {
        self.0.lock().unwrap().clone()
    }
}

struct IdVisitor(Option<String>);

impl Visit for IdVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "id" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

impl<S: Subscriber> Layer<S> for SpanRecorder {
    fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
        let mut visitor = IdVisitor(None);
        attrs.record(&mut visitor);
        self.0
            .lock()
            .unwrap()
            .push((attrs.metadata().name().to_string(), visitor.0));
    }
}
