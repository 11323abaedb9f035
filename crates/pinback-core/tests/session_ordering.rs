use pinback_core::{
    Catalog, FetchError, FilterAction, FilterState, ImageRecord, Outcome, Query, Session,
    SessionConfig,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

/// Holds each image request until the test releases its keyword.
#[derive(Default)]
struct GatedCatalog {
    released: Mutex<HashSet<String>>,
    cv: Condvar,
    calls: AtomicUsize,
}

impl GatedCatalog {
    fn release(&self, keyword: &str) {
        self.released.lock().unwrap().insert(keyword.to_string());
        self.cv.notify_all();
    }
}

impl Catalog for GatedCatalog {
    fn images(&self, query: &Query) -> Result<Vec<ImageRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = query.keyword.clone().unwrap_or_default();
        let mut released = self.released.lock().unwrap();
        while !released.contains(&key) {
            released = self.cv.wait(released).unwrap();
        }
        Ok(vec![ImageRecord::new(1, key)])
    }

    fn suggestions(&self, prefix: &str) -> Result<Vec<String>, FetchError> {
        Ok(vec![prefix.to_string()])
    }

    fn describe(&self, query: &Query) -> String {
        format!("{query:?}")
    }
}

fn start(catalog: Arc<GatedCatalog>) -> Session {
    catalog.release("");
    let mut s = Session::new(catalog, FilterState::default(), SessionConfig::default())
        .expect("session");
    assert!(s.wait_idle(WAIT));
    s
}

#[test]
fn late_response_for_older_query_is_ignored() {
    let catalog = Arc::new(GatedCatalog::default());
    let mut s = start(catalog.clone());

    s.apply(FilterAction::SetKeyword("alpha".into()));
    s.apply(FilterAction::SetKeyword("bravo".into()));
    assert!(s.is_loading());

    catalog.release("bravo");
    assert!(s.wait_idle(WAIT));
    assert_eq!(s.records()[0].title, "bravo");

    catalog.release("alpha");
    assert_eq!(s.wait(WAIT), Some(Outcome::Stale));
    assert_eq!(s.records()[0].title, "bravo");
}

#[test]
fn cosmetic_changes_issue_no_request() {
    let catalog = Arc::new(GatedCatalog::default());
    let mut s = start(catalog.clone());
    let before = catalog.calls.load(Ordering::SeqCst);

    s.apply(FilterAction::SetGridSize(250));
    s.apply(FilterAction::SetRealLifeScale(40));
    s.apply(FilterAction::ToggleRenderMode);
    assert!(!s.is_loading());
    assert_eq!(catalog.calls.load(Ordering::SeqCst), before);

    s.apply(FilterAction::ToggleDateFilter);
    assert!(s.wait_idle(WAIT));
    assert_eq!(catalog.calls.load(Ordering::SeqCst), before + 1);
}

#[test]
fn dropping_session_with_request_in_flight_does_not_hang() {
    let catalog = Arc::new(GatedCatalog::default());
    let mut s = start(catalog.clone());
    s.apply(FilterAction::SetKeyword("never".into()));
    drop(s);
    catalog.release("never");
}
