/// Current UTC timestamp in milliseconds.
///
/// All persisted timestamps (order creation, payment, cancellation) use this
/// representation so window comparisons are plain integer arithmetic.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
