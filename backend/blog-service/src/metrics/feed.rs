use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Feed pages composed, by feed kind (global, group, profile, following).
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_feed_requests_total",
        "Total feed pages composed segmented by feed kind",
        &["feed"]
    )
    .expect("failed to register blog_feed_requests_total");

    /// Time spent rendering a page body, by view.
    pub static ref PAGE_RENDER_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_page_render_duration_seconds",
        "Page render duration segmented by view",
        &["view"]
    )
    .expect("failed to register blog_page_render_duration_seconds");
}
