//! End-to-end tests for the stock/movement consistency rule.
//!
//! Every test runs against a private in-memory database, exercising the same
//! code paths the desktop session uses: post and delete movements, then read
//! the stock back and check the ledger reconciles.

use coursestock_core::{MovementId, StockId, StoreError};
use coursestock_inventory::{
    MovementAction, MovementDetails, MovementDraft, MovementFilter, StockDraft, StockFilter,
};

use crate::InventoryStore;

async fn store() -> InventoryStore {
    InventoryStore::open_in_memory()
        .await
        .expect("in-memory store should open")
}

fn cs100() -> StockDraft {
    StockDraft::new("CS100", 50)
        .with_title("Python Basics")
        .with_language("English")
}

fn movement(stock_id: StockId, action: MovementAction, quantity: i64) -> MovementDraft {
    MovementDraft::new(stock_id, action, quantity).with_details(MovementDetails {
        enrolment_no: Some("EN-1001".to_string()),
        name: Some("John Doe".to_string()),
        remarks: Some("semester issue".to_string()),
        phone: Some("123-456".to_string()),
    })
}

#[tokio::test]
async fn schema_creation_is_idempotent() {
    let store = store().await;
    store.ensure_schema().await.unwrap();
    store.ensure_schema().await.unwrap();

    let stock = store.add_stock(&cs100()).await.unwrap();
    assert_eq!(stock.quantity, 50);
}

#[tokio::test]
async fn round_trip_post_and_delete_restores_quantity() {
    let store = store().await;

    let stock = store.add_stock(&cs100()).await.unwrap();
    let fetched = store
        .get_stock_by_course_code("CS100")
        .await
        .unwrap()
        .expect("CS100 should exist");
    assert_eq!(fetched.quantity, 50);
    assert_eq!(fetched.id, stock.id);

    let posted = store
        .post_movement(&movement(stock.id, MovementAction::Out, 2))
        .await
        .unwrap();
    assert_eq!(posted.course_code, "CS100");

    let after_out = store.get_stock(stock.id).await.unwrap().unwrap();
    assert_eq!(after_out.quantity, 48);

    let listed = store.list_movements(&MovementFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].action, MovementAction::Out);
    assert_eq!(listed[0].quantity, 2);

    store.delete_movement(posted.id).await.unwrap();

    let restored = store.get_stock(stock.id).await.unwrap().unwrap();
    assert_eq!(restored.quantity, 50);
    assert!(store.list_movements(&MovementFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn out_exceeding_quantity_changes_nothing() {
    let store = store().await;
    let stock = store.add_stock(&StockDraft::new("CS200", 3)).await.unwrap();

    let err = store
        .post_movement(&movement(stock.id, MovementAction::Out, 5))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NegativeStock { current: 3, delta: -5 });

    let unchanged = store.get_stock(stock.id).await.unwrap().unwrap();
    assert_eq!(unchanged.quantity, 3);
    assert!(store.list_movements(&MovementFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_in_movement_can_hit_the_negative_stock_rule() {
    let store = store().await;
    let stock = store.add_stock(&StockDraft::new("CS300", 0)).await.unwrap();

    let received = store
        .post_movement(&movement(stock.id, MovementAction::In, 10))
        .await
        .unwrap();
    let issued = store
        .post_movement(&movement(stock.id, MovementAction::Out, 7))
        .await
        .unwrap();

    // Reversing the `in` would need 10 back, but only 3 remain.
    let err = store.delete_movement(received.id).await.unwrap_err();
    assert_eq!(err, StoreError::NegativeStock { current: 3, delta: -10 });

    // The refused delete left the movement in the log and the quantity alone.
    assert!(store.get_movement(received.id).await.unwrap().is_some());
    assert_eq!(store.get_stock(stock.id).await.unwrap().unwrap().quantity, 3);

    // Reversing the `out` first makes room, then the `in` can go.
    store.delete_movement(issued.id).await.unwrap();
    store.delete_movement(received.id).await.unwrap();
    assert_eq!(store.get_stock(stock.id).await.unwrap().unwrap().quantity, 0);
}

#[tokio::test]
async fn quantity_always_equals_initial_plus_live_deltas() {
    let store = store().await;
    let stock = store.add_stock(&StockDraft::new("CS400", 20)).await.unwrap();

    let mut live: Vec<(MovementId, i64)> = Vec::new();
    let plan = [
        (MovementAction::In, 5),
        (MovementAction::Out, 8),
        (MovementAction::In, 2),
        (MovementAction::Out, 4),
        (MovementAction::In, 1),
    ];
    for (action, quantity) in plan {
        let posted = store
            .post_movement(&movement(stock.id, action, quantity))
            .await
            .unwrap();
        live.push((posted.id, action.signed_delta(quantity)));
    }

    // Delete the second and fourth movements.
    for index in [3, 1] {
        let (id, _) = live.remove(index);
        store.delete_movement(id).await.unwrap();
    }

    let expected: i64 = 20 + live.iter().map(|(_, delta)| delta).sum::<i64>();
    let current = store.get_stock(stock.id).await.unwrap().unwrap().quantity;
    assert_eq!(current, expected);

    let log = store.list_movements(&MovementFilter::default()).await.unwrap();
    assert_eq!(log.len(), live.len());
}

#[tokio::test]
async fn duplicate_course_code_is_rejected_and_leaves_stock_unchanged() {
    let store = store().await;
    store.add_stock(&cs100()).await.unwrap();

    let err = store
        .add_stock(&StockDraft::new("CS100", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)));

    let all = store.list_stock(&StockFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].quantity, 50);
}

#[tokio::test]
async fn update_stock_checks_existence_and_course_code_collisions() {
    let store = store().await;
    let first = store.add_stock(&StockDraft::new("CS100", 5)).await.unwrap();
    let second = store.add_stock(&StockDraft::new("CS200", 9)).await.unwrap();

    let err = store
        .update_stock(StockId::new(9999), &StockDraft::new("CS900", 1))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);

    let err = store
        .update_stock(second.id, &StockDraft::new("CS100", 9))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)));

    // A full overwrite, quantity included, sticks as given.
    let updated = store
        .update_stock(first.id, &StockDraft::new("CS101", 40).with_title("Rust Basics"))
        .await
        .unwrap();
    assert_eq!(updated.course_code, "CS101");
    let reread = store.get_stock(first.id).await.unwrap().unwrap();
    assert_eq!(reread.quantity, 40);
    assert_eq!(reread.title.as_deref(), Some("Rust Basics"));
}

#[tokio::test]
async fn delete_stock_is_blocked_while_movements_reference_it() {
    let store = store().await;
    let stock = store.add_stock(&StockDraft::new("CS500", 10)).await.unwrap();
    let posted = store
        .post_movement(&movement(stock.id, MovementAction::Out, 1))
        .await
        .unwrap();

    let err = store.delete_stock(stock.id).await.unwrap_err();
    assert_eq!(err, StoreError::HasDependents);
    assert!(store.get_stock(stock.id).await.unwrap().is_some());

    store.delete_movement(posted.id).await.unwrap();
    store.delete_stock(stock.id).await.unwrap();
    assert!(store.get_stock(stock.id).await.unwrap().is_none());

    let err = store.delete_stock(stock.id).await.unwrap_err();
    assert_eq!(err, StoreError::NotFound);
}

#[tokio::test]
async fn updating_details_never_touches_stock_quantity() {
    let store = store().await;
    let stock = store.add_stock(&StockDraft::new("CS600", 12)).await.unwrap();
    let posted = store
        .post_movement(&movement(stock.id, MovementAction::Out, 2))
        .await
        .unwrap();

    store
        .update_movement_details(
            posted.id,
            &MovementDetails {
                enrolment_no: Some("EN-2002".to_string()),
                name: Some("Jane Roe".to_string()),
                remarks: None,
                phone: None,
            },
        )
        .await
        .unwrap();

    let reread = store.get_movement(posted.id).await.unwrap().unwrap();
    assert_eq!(reread.details.name.as_deref(), Some("Jane Roe"));
    assert_eq!(reread.details.remarks, None);
    // Immutable fields survive the edit.
    assert_eq!(reread.action, MovementAction::Out);
    assert_eq!(reread.quantity, 2);
    assert_eq!(reread.recorded_at, posted.recorded_at);

    assert_eq!(store.get_stock(stock.id).await.unwrap().unwrap().quantity, 10);

    let err = store
        .update_movement_details(MovementId::new(9999), &MovementDetails::default())
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);
}

#[tokio::test]
async fn stock_listing_filters_and_orders_by_course_code() {
    let store = store().await;
    store
        .add_stock(&StockDraft::new("MA101", 4).with_language("German"))
        .await
        .unwrap();
    store
        .add_stock(&StockDraft::new("CS105", 7).with_title("Data Structures"))
        .await
        .unwrap();
    store.add_stock(&StockDraft::new("CS120", 3)).await.unwrap();

    let all = store.list_stock(&StockFilter::default()).await.unwrap();
    let codes: Vec<&str> = all.iter().map(|s| s.course_code.as_str()).collect();
    assert_eq!(codes, vec!["CS105", "CS120", "MA101"]);

    let cs1 = store
        .list_stock(&StockFilter::by_course_code("CS1"))
        .await
        .unwrap();
    assert_eq!(cs1.len(), 2);
    assert!(cs1.iter().all(|s| s.course_code.contains("CS1")));

    // ANDed predicates: course code and title must both match.
    let narrowed = store
        .list_stock(&StockFilter {
            course_code: Some("CS1".to_string()),
            title: Some("Data".to_string()),
            language: None,
        })
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].course_code, "CS105");

    // A blank term is the same as no term.
    let blank = store
        .list_stock(&StockFilter {
            course_code: Some("  ".to_string()),
            title: None,
            language: None,
        })
        .await
        .unwrap();
    assert_eq!(blank.len(), 3);
}

#[tokio::test]
async fn movement_listing_filters_and_orders_most_recent_first() {
    let store = store().await;
    let cs = store.add_stock(&StockDraft::new("CS700", 30)).await.unwrap();
    let ma = store.add_stock(&StockDraft::new("MA700", 30)).await.unwrap();

    store
        .post_movement(&movement(cs.id, MovementAction::Out, 1))
        .await
        .unwrap();
    store
        .post_movement(&MovementDraft::new(ma.id, MovementAction::In, 5).with_details(
            MovementDetails {
                enrolment_no: Some("EN-9".to_string()),
                name: Some("Restock".to_string()),
                remarks: Some("warehouse".to_string()),
                phone: None,
            },
        ))
        .await
        .unwrap();
    store
        .post_movement(&movement(cs.id, MovementAction::Out, 2))
        .await
        .unwrap();

    let all = store.list_movements(&MovementFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    // Same-second timestamps fall back to id order, newest insert first.
    assert!(all[0].id > all[1].id && all[1].id > all[2].id);

    let outs = store
        .list_movements(&MovementFilter::by_action(MovementAction::Out))
        .await
        .unwrap();
    assert_eq!(outs.len(), 2);
    assert!(outs.iter().all(|m| m.action == MovementAction::Out));
    assert!(outs.iter().all(|m| m.course_code == "CS700"));

    let by_name = store
        .list_movements(&MovementFilter {
            name: Some("Rest".to_string()),
            ..MovementFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].course_code, "MA700");

    let by_code_and_action = store
        .list_movements(&MovementFilter {
            course_code: Some("CS7".to_string()),
            action: Some(MovementAction::In),
            ..MovementFilter::default()
        })
        .await
        .unwrap();
    assert!(by_code_and_action.is_empty());
}

#[tokio::test]
async fn posting_against_a_missing_stock_fails_not_found() {
    let store = store().await;
    let err = store
        .post_movement(&MovementDraft::new(
            StockId::new(4242),
            MovementAction::In,
            1,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound);

    let err = store.delete_movement(MovementId::new(4242)).await.unwrap_err();
    assert_eq!(err, StoreError::NotFound);

    assert!(store.get_movement(MovementId::new(4242)).await.unwrap().is_none());
    assert!(store.get_stock(StockId::new(4242)).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_movement_drafts_never_reach_the_database() {
    let store = store().await;
    let stock = store.add_stock(&StockDraft::new("CS800", 5)).await.unwrap();

    let err = store
        .post_movement(&MovementDraft::new(stock.id, MovementAction::In, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));

    assert!(store.list_movements(&MovementFilter::default()).await.unwrap().is_empty());
    assert_eq!(store.get_stock(stock.id).await.unwrap().unwrap().quantity, 5);
}
