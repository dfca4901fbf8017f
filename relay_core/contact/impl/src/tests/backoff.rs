use std::time::Duration;

use crate::backoff;

#[test]
fn doubles_per_retry() {
    let initial = Duration::from_millis(500);

    assert_eq!(backoff(initial, 0), Duration::from_millis(500));
    assert_eq!(backoff(initial, 1), Duration::from_secs(1));
    assert_eq!(backoff(initial, 2), Duration::from_secs(2));
}

#[test]
fn saturates() {
    assert_eq!(backoff(Duration::MAX, 3), Duration::MAX);
    assert_eq!(
        backoff(Duration::from_millis(1), 100),
        Duration::from_millis(1 << 16)
    );
}
