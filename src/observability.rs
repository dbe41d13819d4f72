use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("thinkstream.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("thinkstream.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("thinkstream.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("thinkstream.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("thinkstream.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("thinkstream.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("thinkstream.stream.ttfb_seconds");
pub(crate) static STREAM_DURATION: Moments = Moments::new("thinkstream.stream.duration_seconds");

pub(crate) static CHAT_TURNS: Counter = Counter::new("thinkstream.chat.turns");
pub(crate) static CHAT_TURN_ERRORS: Counter = Counter::new("thinkstream.chat.turn_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_TURN_ERRORS);
}
