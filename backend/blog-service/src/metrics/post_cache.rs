use lazy_static::lazy_static;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

lazy_static! {
    /// Post list cache probe outcomes (hit/miss/corrupt/error/timeout).
    pub static ref POST_LIST_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "post_list_cache_events_total",
        "Post list cache probes segmented by outcome",
        &["event"]
    )
    .expect("failed to register post_list_cache_events_total");

    /// Post list cache write results (success/error).
    pub static ref POST_LIST_CACHE_WRITE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_list_cache_write_total",
        "Post list cache write attempts segmented by outcome",
        &["result"]
    )
    .expect("failed to register post_list_cache_write_total");

    /// Time spent loading a user's posts from PostgreSQL after a miss.
    pub static ref POST_LIST_REPOSITORY_FETCH_SECONDS: Histogram = register_histogram!(
        "post_list_repository_fetch_seconds",
        "Repository fetch duration for post lists on cache miss"
    )
    .expect("failed to register post_list_repository_fetch_seconds");
}
