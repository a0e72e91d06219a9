//! Request spans for every route, including public redirects.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Span and response events for the whole router.
///
/// Spans are opened at `DEBUG` so that `RUST_LOG=info` keeps only the access
/// log line per request. Responses are reported with their latency; `5xx`
/// responses are additionally logged at `ERROR`. Client errors such as
/// `invalid-token` or `not-found` are ordinary outcomes and are not failures.
///
/// ```text
/// DEBUG request{method=PUT uri=/urls/docs version=HTTP/1.1}: finished processing request latency=4 ms status=201
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::DEBUG)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
