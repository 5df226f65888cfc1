use super::*;

fn record(available: bool, assigned_to: Option<&str>, password: Option<&str>) -> PersonRecord {
    PersonRecord {
        available,
        assigned_to: assigned_to.map(str::to_owned),
        password: password.map(str::to_owned),
    }
}

fn seeded() -> MemoryStore {
    let mut records = BTreeMap::new();
    records.insert("A".to_owned(), record(true, None, Some("a")));
    records.insert("B".to_owned(), record(true, None, Some("b")));
    records.insert("C".to_owned(), record(false, Some("X"), Some("c")));
    records.insert("D".to_owned(), record(true, None, Some("d")));
    MemoryStore::with_records(records)
}

// =============================================================================
// point reads / writes
// =============================================================================

#[tokio::test]
async fn get_missing_returns_none() {
    let store = MemoryStore::new();
    assert!(store.get("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let store = MemoryStore::new();
    store
        .create("Alice", PersonRecord::new(Some("pw".into())))
        .await
        .unwrap();
    let got = store.get("Alice").await.unwrap().unwrap();
    assert!(got.available);
    assert!(got.assigned_to.is_none());
    assert_eq!(got.password.as_deref(), Some("pw"));
}

#[tokio::test]
async fn create_existing_is_rejected() {
    let store = seeded();
    let err = store.create("A", PersonRecord::new(None)).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(id) if id == "A"));
}

#[tokio::test]
async fn claim_password_sets_unclaimed_record() {
    let store = MemoryStore::new();
    store.create("Bob", PersonRecord::new(None)).await.unwrap();
    assert!(store.claim_password("Bob", "secret").await.unwrap());
    assert_eq!(store.get("Bob").await.unwrap().unwrap().password.as_deref(), Some("secret"));
}

#[tokio::test]
async fn only_the_first_claim_wins() {
    let store = MemoryStore::new();
    store.create("Bob", PersonRecord::new(None)).await.unwrap();

    // Both claimants saw an unclaimed record.
    assert!(store.get("Bob").await.unwrap().unwrap().password.is_none());
    assert!(store.claim_password("Bob", "first").await.unwrap());
    assert!(!store.claim_password("Bob", "second").await.unwrap());
    assert_eq!(store.get("Bob").await.unwrap().unwrap().password.as_deref(), Some("first"));
}

#[tokio::test]
async fn claim_password_on_missing_is_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(store.claim_password("ghost", "x").await, Err(StoreError::NotFound(_))));
}

// =============================================================================
// record_draw
// =============================================================================

#[tokio::test]
async fn record_draw_updates_both_records() {
    let store = seeded();
    store.record_draw("D", "A").await.unwrap();

    let winner = store.get("A").await.unwrap().unwrap();
    assert!(!winner.available);
    assert_eq!(winner.assigned_to.as_deref(), Some("D"));

    let drawer = store.get("D").await.unwrap().unwrap();
    assert!(drawer.available, "drawing does not make the drawer unavailable");
    assert_eq!(drawer.assigned_to.as_deref(), Some("A"));
}

#[tokio::test]
async fn record_draw_flips_exactly_one_availability() {
    let store = seeded();
    let before = store.snapshot();
    store.record_draw("D", "B").await.unwrap();
    let after = store.snapshot();

    let flipped: Vec<&str> = before
        .values()
        .filter(|p| p.available && !after[&p.id].available)
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(flipped, vec!["B"]);
}

#[tokio::test]
async fn record_draw_of_unavailable_winner_writes_nothing() {
    let store = seeded();
    let err = store.record_draw("D", "C").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.get("D").await.unwrap().unwrap().assigned_to.is_none());
    assert_eq!(store.get("C").await.unwrap().unwrap().assigned_to.as_deref(), Some("X"));
}

#[tokio::test]
async fn record_draw_twice_by_same_drawer_is_rejected() {
    let store = seeded();
    store.record_draw("D", "A").await.unwrap();
    let err = store.record_draw("D", "B").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.get("B").await.unwrap().unwrap().available);
}

#[tokio::test]
async fn empty_assignment_counts_as_not_drawn() {
    let mut records = BTreeMap::new();
    records.insert("A".to_owned(), record(true, Some(""), Some("a")));
    records.insert("B".to_owned(), record(true, None, Some("b")));
    let store = MemoryStore::with_records(records);
    assert!(!store.snapshot()["A"].has_drawn());

    store.record_draw("A", "B").await.unwrap();
    assert_eq!(store.get("A").await.unwrap().unwrap().assigned_to.as_deref(), Some("B"));
    assert!(store.snapshot()["A"].has_drawn());
}

#[tokio::test]
async fn record_draw_of_self_is_rejected() {
    let store = seeded();
    assert!(matches!(store.record_draw("A", "A").await, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn record_draw_with_unknown_participant_is_not_found() {
    let store = seeded();
    assert!(matches!(store.record_draw("Z", "A").await, Err(StoreError::NotFound(id)) if id == "Z"));
    assert!(matches!(store.record_draw("D", "Z").await, Err(StoreError::NotFound(id)) if id == "Z"));
}

// =============================================================================
// snapshots
// =============================================================================

#[tokio::test]
async fn subscribe_starts_with_current_collection() {
    let store = seeded();
    let rx = store.subscribe();
    let people = rx.borrow().clone();
    assert_eq!(people.keys().cloned().collect::<Vec<_>>(), vec!["A", "B", "C", "D"]);
}

#[tokio::test]
async fn writes_publish_full_snapshots() {
    let store = seeded();
    let mut rx = store.subscribe();
    let _ = rx.borrow_and_update();

    store.create("E", PersonRecord::new(None)).await.unwrap();
    assert!(rx.has_changed().unwrap());
    let people = rx.borrow_and_update().clone();
    assert_eq!(people.len(), 5);
    assert!(people["E"].available);

    store.record_draw("E", "A").await.unwrap();
    let people = rx.borrow_and_update().clone();
    assert!(!people["A"].available);
    assert_eq!(people["E"].assigned_to.as_deref(), Some("A"));
}

#[tokio::test]
async fn failed_writes_publish_nothing() {
    let store = seeded();
    let mut rx = store.subscribe();
    let _ = rx.borrow_and_update();

    let _ = store.record_draw("D", "C").await;
    let _ = store.create("A", PersonRecord::new(None)).await;
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn snapshot_never_exposes_passwords() {
    let store = seeded();
    let json = serde_json::to_string(&*store.snapshot()).unwrap();
    assert!(!json.contains("password"));
    assert!(json.contains("assignedTo"));
}

// =============================================================================
// seed
// =============================================================================

#[tokio::test]
async fn seed_creates_only_missing_names_without_password() {
    let store = seeded();
    let created = store
        .seed(&["A".to_owned(), "Eve".to_owned(), "Finn".to_owned()])
        .await
        .unwrap();
    assert_eq!(created, 2);
    assert!(store.get("Eve").await.unwrap().unwrap().password.is_none());
    assert_eq!(store.get("A").await.unwrap().unwrap().password.as_deref(), Some("a"));
}
