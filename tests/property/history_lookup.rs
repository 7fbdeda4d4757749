//! Property tests for rank and time lookups on a history chain

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use tagtree::history::History;
use tagtree::types::EntityId;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
}

/// A history whose n-th snapshot holds `n`, taken at the given second offsets.
fn build(gaps: &[i64]) -> (History<usize>, Vec<DateTime<Utc>>) {
    let subject = EntityId::from(tagtree::types::ItemId::from_raw(0));
    let mut at = start();
    let mut times = vec![at];
    let mut history = History::new(subject, 0, at);
    for (n, gap) in gaps.iter().enumerate() {
        at = at + Duration::seconds(*gap);
        times.push(at);
        history.log(n + 1, at).unwrap();
    }
    (history, times)
}

proptest! {
    /// Rank r is always the (r + 1)-th snapshot back from the latest
    #[test]
    fn test_snap_rank(gaps in prop::collection::vec(0i64..10, 0..30), rank in 0usize..40) {
        let (history, _) = build(&gaps);
        let view = history.view();
        let latest = gaps.len();
        match view.snap(rank) {
            Some(snap) => {
                prop_assert!(rank < latest);
                prop_assert_eq!(*snap.state(), latest - rank - 1);
            }
            None => prop_assert!(rank >= latest),
        }
    }

    /// The snapshot found for a time is the newest one not after it
    #[test]
    fn test_snap_before(gaps in prop::collection::vec(0i64..10, 0..30), offset in -5i64..400) {
        let (history, times) = build(&gaps);
        let at = start() + Duration::seconds(offset);
        let expected = times.iter().rposition(|t| *t <= at);
        let found = history.view().snap_before(at).map(|s| *s.state());
        prop_assert_eq!(found, expected);
    }
}
