use credential_router::domain::order::{META_SESSION_ID, OrderId, OrderRecord};
use credential_router::domain::ports::{OrderStoreBox, PaymentBackendBox};
use credential_router::infrastructure::in_memory::InMemoryOrderStore;
use credential_router::infrastructure::simulated::SimulatedBackend;

mod common;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let order_store: OrderStoreBox = Box::new(InMemoryOrderStore::new());
    let backend: PaymentBackendBox = Box::new(SimulatedBackend::new("przelewy24.pl"));
    let credentials = common::sample_table().default_set().clone();

    // Verify Send + Sync by spawning tasks
    let store_handle = tokio::spawn(async move {
        order_store
            .save_order(OrderRecord::new(OrderId(1), Some("PL-MA".into()), None))
            .await
            .unwrap();
        order_store
            .put_order_meta(OrderId(1), META_SESSION_ID, "1-00000001")
            .await
            .unwrap();
        order_store
            .find_order_by_meta(META_SESSION_ID, "1-00000001")
            .await
            .unwrap()
    });

    let backend_handle = tokio::spawn(async move {
        backend
            .submit_transaction(OrderId(1), &credentials)
            .await
            .unwrap()
    });

    assert_eq!(store_handle.await.unwrap(), Some(OrderId(1)));

    let submission = backend_handle.await.unwrap();
    assert!(submission.redirect_url.contains("/trnRequest/1-"));
}
