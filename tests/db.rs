//! Tests for the persistence queries backing the return flow.

mod common;
use common::*;

#[test]
fn absent_mapping_is_none_not_an_error() {
    let conn = setup_test_db();
    let mapping = queries::find_payment_reference(&conn, "nope").unwrap();
    assert!(mapping.is_none());
}

#[test]
fn mapping_roundtrip() {
    let conn = setup_test_db();
    let order = create_test_order(&conn);
    map_reference(&conn, "ref-1", &order.id);

    let mapping = queries::find_payment_reference(&conn, "ref-1")
        .unwrap()
        .expect("mapping exists");
    assert_eq!(mapping.order_id, order.id);
}

#[test]
fn mark_paid_is_a_guarded_swap() {
    let conn = setup_test_db();
    let order = create_test_order(&conn);

    assert!(queries::mark_order_paid(&conn, &order.id, "ref-1").unwrap());
    assert!(
        !queries::mark_order_paid(&conn, &order.id, "ref-1").unwrap(),
        "second call must be a no-op"
    );
}

#[test]
fn mark_failed_never_touches_a_paid_order() {
    let conn = setup_test_db();
    let order = create_test_order(&conn);

    queries::mark_order_paid(&conn, &order.id, "ref-1").unwrap();
    assert!(!queries::mark_order_failed(&conn, &order.id, "declined").unwrap());
    assert_eq!(get_order(&conn, &order.id).status, OrderStatus::Paid);
}

#[test]
fn mark_paid_clears_an_earlier_failure() {
    let conn = setup_test_db();
    let order = create_test_order(&conn);

    queries::mark_order_failed(&conn, &order.id, "declined").unwrap();
    assert!(queries::mark_order_paid(&conn, &order.id, "ref-1").unwrap());

    let order = get_order(&conn, &order.id);
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.failure_reason.is_none());
}
