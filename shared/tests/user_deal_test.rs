mod common;

use rust_decimal_macros::dec;
use shared::models::CreateUserDealRequest;
use shared::services::{SignalService, UserDealService};
use shared::SyncError;

use common::{setup_db, signal_input};

fn request(user_id: &str, signal_id: i32) -> CreateUserDealRequest {
    CreateUserDealRequest {
        user_id: user_id.to_string(),
        signal_id,
        qty: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_create_from_signal_copies_projection() {
    let db = setup_db().await;
    let signals = SignalService::new(db.clone());
    let user_deals = UserDealService::new(db.clone());

    let (signal, _) = signals
        .create(signal_input("TEST", dec!(100), dec!(50), Some(dec!(52))))
        .await
        .unwrap();

    let deal = user_deals.create_from_signal(request("ucc-1", signal.id)).await.unwrap();
    assert_eq!(deal.user_id, "ucc-1");
    assert_eq!(deal.admin_signal_id, Some(signal.id));
    assert_eq!(deal.symbol, "TEST");
    assert_eq!(deal.qty, dec!(100));
    assert_eq!(deal.inv, dec!(5000));
    assert_eq!(deal.cmp, Some(dec!(52)));
    assert_eq!(deal.pl, Some(dec!(200)));
    assert_eq!(deal.tp, Some(dec!(57.50)));
    assert_eq!(deal.status, "ACTIVE");
}

#[tokio::test]
async fn test_quantity_override() {
    let db = setup_db().await;
    let signals = SignalService::new(db.clone());
    let user_deals = UserDealService::new(db.clone());
    let (signal, _) = signals
        .create(signal_input("TEST", dec!(100), dec!(50), Some(dec!(52))))
        .await
        .unwrap();

    let mut req = request("ucc-1", signal.id);
    req.qty = Some(dec!(3));
    let deal = user_deals.create_from_signal(req).await.unwrap();
    assert_eq!(deal.inv, dec!(150));
    assert_eq!(deal.pl, Some(dec!(6)));

    let mut bad = request("ucc-1", signal.id);
    bad.qty = Some(dec!(0));
    assert!(matches!(user_deals.create_from_signal(bad).await, Err(SyncError::InvalidInput(_))));
}

#[tokio::test]
async fn test_rejects_closed_missing_and_anonymous() {
    let db = setup_db().await;
    let signals = SignalService::new(db.clone());
    let user_deals = UserDealService::new(db.clone());
    let (signal, _) = signals
        .create(signal_input("TEST", dec!(1), dec!(10), None))
        .await
        .unwrap();

    assert!(matches!(
        user_deals.create_from_signal(request("  ", signal.id)).await,
        Err(SyncError::InvalidInput(_))
    ));
    assert!(matches!(
        user_deals.create_from_signal(request("ucc-1", 999)).await,
        Err(SyncError::NotFound { .. })
    ));

    signals.close(signal.id).await.unwrap();
    assert!(matches!(
        user_deals.create_from_signal(request("ucc-1", signal.id)).await,
        Err(SyncError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_list_close_delete() {
    let db = setup_db().await;
    let signals = SignalService::new(db.clone());
    let user_deals = UserDealService::new(db.clone());
    let (signal, _) = signals
        .create(signal_input("TEST", dec!(1), dec!(10), None))
        .await
        .unwrap();

    let first = user_deals.create_from_signal(request("ucc-1", signal.id)).await.unwrap();
    user_deals.create_from_signal(request("ucc-1", signal.id)).await.unwrap();
    user_deals.create_from_signal(request("ucc-2", signal.id)).await.unwrap();

    assert_eq!(user_deals.list_for_user("ucc-1").await.unwrap().len(), 2);
    assert_eq!(user_deals.list_for_user("ucc-2").await.unwrap().len(), 1);

    let closed = user_deals.close(first.id).await.unwrap();
    assert_eq!(closed.status, "CLOSED");
    assert_eq!(closed.pos, 0);

    user_deals.delete(first.id).await.unwrap();
    assert_eq!(user_deals.list_for_user("ucc-1").await.unwrap().len(), 1);
    assert!(matches!(user_deals.delete(first.id).await, Err(SyncError::NotFound { .. })));
}
