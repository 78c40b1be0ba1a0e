//! Integration tests for single-asset lifecycle transitions.

mod helpers;

use chrono::{TimeZone, Utc};

use assettrack_core::error::ErrorKind;
use assettrack_core::events::AssetEvent;
use assettrack_core::types::id::{AssetId, CompanyId, LocationId, UserId};
use assettrack_core::types::pagination::PageRequest;
use assettrack_entity::asset::{AssetEdit, AssetFilter, AssetPatch, AssetState, NewAsset};
use assettrack_entity::audit::ActionKind;
use assettrack_service::{CheckinOutcome, CheckinRequest, CheckoutRequest, EditOutcome};

use helpers::{ADMIN, BROKEN, HOLDER, OTHER_HOLDER, OUTSIDER, PENDING, READY, TestApp};

#[tokio::test]
async fn test_checkout_backdated() {
    let mut app = TestApp::new().await;
    let id = app.add_asset(100, READY).await;
    let actor = app.actor(ADMIN).await;

    let entry = app
        .lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER).at("2024-01-10 00:00:00"))
        .await
        .unwrap();

    let at = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    let asset = app.asset(id).await;
    assert_eq!(asset.assigned_to, Some(HOLDER));
    assert_eq!(asset.last_checkout, Some(at));
    assert_eq!(asset.version, 1);

    assert_eq!(entry.action, "checkout");
    assert_eq!(entry.checkedout_to, Some(HOLDER));
    assert_eq!(entry.actor_id, ADMIN);
    assert_eq!(entry.created_at, at);
    assert_eq!(app.entries(id).await.len(), 1);

    let events = app.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].payload,
        AssetEvent::CheckedOut { assigned_to, .. } if assigned_to == HOLDER
    ));
}

#[tokio::test]
async fn test_checkin_defaults_to_now_then_reports_already_checked_in() {
    let mut app = TestApp::new().await;
    let id = app.add_asset(100, READY).await;
    let actor = app.actor(ADMIN).await;
    let expected = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

    let mut request = CheckoutRequest::to(HOLDER).at("2024-01-10 00:00:00");
    request.expected_checkin = Some(expected);
    app.lifecycle.checkout(&actor, id, request).await.unwrap();

    let outcome = app
        .lifecycle
        .checkin(&actor, id, CheckinRequest::default())
        .await
        .unwrap();
    let CheckinOutcome::CheckedIn(entry) = outcome else {
        panic!("expected a checkin entry, got {outcome:?}");
    };
    assert_eq!(entry.action, "checkin from");
    assert_eq!(entry.checkedout_to, Some(HOLDER));
    assert_eq!(entry.created_at, app.now);

    let asset = app.asset(id).await;
    assert_eq!(asset.assigned_to, None);
    assert_eq!(asset.last_checkout, None);
    assert_eq!(asset.expected_checkin, None);
    assert_eq!(asset.accepted, None);
    assert_eq!(app.entries(id).await.len(), 2);

    let again = app
        .lifecycle
        .checkin(&actor, id, CheckinRequest::default())
        .await
        .unwrap();
    assert_eq!(again, CheckinOutcome::AlreadyCheckedIn);
    assert_eq!(app.entries(id).await.len(), 2);
    assert_eq!(app.drain_events().len(), 2);
}

#[tokio::test]
async fn test_checkin_can_set_status_label() {
    let app = TestApp::new().await;
    let id = app.add_asset(101, READY).await;
    let actor = app.actor(ADMIN).await;
    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();

    let request = CheckinRequest {
        status_id: Some(BROKEN),
        note: Some("screen cracked".to_string()),
        ..CheckinRequest::default()
    };
    app.lifecycle.checkin(&actor, id, request).await.unwrap();

    let asset = app.asset(id).await;
    assert_eq!(asset.status_id, Some(BROKEN));
    assert_eq!(
        app.lifecycle.state_of(&asset).await.unwrap(),
        AssetState::Undeployable
    );
}

#[tokio::test]
async fn test_checkout_can_rename_asset() {
    let app = TestApp::new().await;
    let id = app.add_asset(102, READY).await;
    let actor = app.actor(ADMIN).await;

    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER).named("Jane's laptop"))
        .await
        .unwrap();
    let asset = app.asset(id).await;
    assert_eq!(asset.name.as_deref(), Some("Jane's laptop"));
    assert_eq!(asset.assigned_to, Some(HOLDER));

    app.lifecycle
        .checkin(&actor, id, CheckinRequest::default())
        .await
        .unwrap();
    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(OTHER_HOLDER).named("   "))
        .await
        .unwrap();
    assert_eq!(app.asset(id).await.name.as_deref(), Some("Jane's laptop"));
}

#[tokio::test]
async fn test_checkin_entry_has_no_location() {
    let app = TestApp::new().await;
    let id = app.add_asset(103, READY).await;
    let mut stored = app.asset(id).await;
    stored.rtd_location_id = Some(LocationId(12));
    app.store.put_asset(stored).await;
    let actor = app.actor(ADMIN).await;

    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();
    let outcome = app
        .lifecycle
        .checkin(&actor, id, CheckinRequest::default())
        .await
        .unwrap();
    let CheckinOutcome::CheckedIn(entry) = outcome else {
        panic!("expected a checkin entry, got {outcome:?}");
    };
    assert_eq!(entry.location_id, None);
    assert_eq!(app.asset(id).await.rtd_location_id, Some(LocationId(12)));
}

#[tokio::test]
async fn test_checkout_rejects_unavailable_assets() {
    let app = TestApp::new().await;
    let actor = app.actor(ADMIN).await;

    let pending = app.add_asset(110, PENDING).await;
    let err = app
        .lifecycle
        .checkout(&actor, pending, CheckoutRequest::to(HOLDER))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);

    let ready = app.add_asset(111, READY).await;
    app.lifecycle
        .checkout(&actor, ready, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();
    let err = app
        .lifecycle
        .checkout(&actor, ready, CheckoutRequest::to(OTHER_HOLDER))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);
    assert_eq!(app.asset(ready).await.assigned_to, Some(HOLDER));
    assert!(app.entries(pending).await.is_empty());
    assert_eq!(app.entries(ready).await.len(), 1);
}

#[tokio::test]
async fn test_checkout_to_unknown_or_deleted_user_is_not_found() {
    let app = TestApp::new().await;
    let id = app.add_asset(112, READY).await;
    let actor = app.actor(ADMIN).await;

    for target in [UserId(999), UserId(60)] {
        let err = app
            .lifecycle
            .checkout(&actor, id, CheckoutRequest::to(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
    assert_eq!(app.asset(id).await.version, 0);
}

#[tokio::test]
async fn test_concurrent_checkouts_have_one_winner() {
    let app = TestApp::new().await;
    let id = app.add_asset(120, READY).await;
    let actor = app.actor(ADMIN).await;

    let (first, second) = tokio::join!(
        app.lifecycle
            .checkout(&actor, id, CheckoutRequest::to(HOLDER)),
        app.lifecycle
            .checkout(&actor, id, CheckoutRequest::to(OTHER_HOLDER)),
    );

    let results = [first, second];
    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    let conflicts: Vec<_> = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .filter(|e| e.kind == ErrorKind::Conflict)
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(app.entries(id).await.len(), 1);
    assert!(app.asset(id).await.assigned_to.is_some());
}

#[tokio::test]
async fn test_access_denied_short_circuits() {
    let mut app = TestApp::scoped().await;
    let id = app
        .add_company_asset(130, READY, Some(CompanyId(1)))
        .await;
    let outsider = app.actor(OUTSIDER).await;

    let err = app
        .lifecycle
        .checkout(&outsider, id, CheckoutRequest::to(OUTSIDER))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = app.lifecycle.soft_delete(&outsider, id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let err = app.audit.history(&outsider, id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let asset = app.asset(id).await;
    assert_eq!(asset.version, 0);
    assert!(asset.deleted_at.is_none());
    assert!(app.entries(id).await.is_empty());
    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_audit_failure_rolls_back_checkout() {
    let mut app = TestApp::new().await;
    let id = app.add_asset(140, READY).await;
    let actor = app.actor(ADMIN).await;
    app.store.fail_audit_writes_for(id).await;

    let err = app
        .lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Persistence);

    let asset = app.asset(id).await;
    assert_eq!(asset.assigned_to, None);
    assert_eq!(asset.version, 0);
    assert!(app.entries(id).await.is_empty());
    assert!(app.drain_events().is_empty());

    app.store.clear_failures().await;
    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();
    assert_eq!(app.asset(id).await.assigned_to, Some(HOLDER));
}

#[tokio::test]
async fn test_delete_then_restore_keeps_custody_cleared() {
    let app = TestApp::new().await;
    let id = app.add_asset(150, READY).await;
    let actor = app.actor(ADMIN).await;
    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();

    app.lifecycle.soft_delete(&actor, id).await.unwrap();
    let deleted = app.asset(id).await;
    assert!(deleted.deleted_at.is_some());
    assert_eq!(deleted.assigned_to, None);

    let err = app.lifecycle.soft_delete(&actor, id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);
    let err = app
        .lifecycle
        .checkin(&actor, id, CheckinRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);

    app.lifecycle.restore(&actor, id).await.unwrap();
    let restored = app.asset(id).await;
    assert!(restored.deleted_at.is_none());
    assert_eq!(restored.assigned_to, None);
    assert_eq!(restored.last_checkout, None);
    assert_eq!(
        app.lifecycle.state_of(&restored).await.unwrap(),
        AssetState::ReadyToDeploy
    );

    let err = app.lifecycle.restore(&actor, id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);

    let actions: Vec<_> = app
        .audit
        .history(&actor, id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["restored", "deleted", "checkout"]);
}

#[tokio::test]
async fn test_deleted_assets_are_hidden_from_reads() {
    let app = TestApp::new().await;
    let id = app.add_asset(160, READY).await;
    let actor = app.actor(ADMIN).await;
    app.lifecycle.soft_delete(&actor, id).await.unwrap();

    let err = app.lifecycle.get_asset(&actor, id, false).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(app.lifecycle.get_asset(&actor, id, true).await.is_ok());

    let err = app.lifecycle.clone_asset(&actor, id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let page = PageRequest::new(1, 50);
    let all = app
        .lifecycle
        .list_assets(&actor, AssetFilter::All, &page)
        .await
        .unwrap();
    assert!(all.items.iter().all(|a| a.id != id));
    let deleted = app
        .lifecycle
        .list_assets(&actor, AssetFilter::Deleted, &page)
        .await
        .unwrap();
    assert_eq!(deleted.items.len(), 1);
    assert_eq!(app.audit.history(&actor, id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_clone_resets_identity_and_custody() {
    let app = TestApp::new().await;
    let id = app.add_asset(170, READY).await;
    let actor = app.actor(ADMIN).await;
    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();

    let draft = app.lifecycle.clone_asset(&actor, id).await.unwrap();
    assert_eq!(draft.asset_tag, "");
    assert_eq!(draft.serial, None);
    assert_eq!(draft.assigned_to, None);
    assert_eq!(draft.name.as_deref(), Some("Laptop 170"));
    assert_eq!(draft.status_id, Some(READY));
    assert_eq!(app.entries(id).await.len(), 1);
}

#[tokio::test]
async fn test_create_with_custodian_checks_out_atomically() {
    let app = TestApp::new().await;
    let actor = app.actor(ADMIN).await;

    let draft = NewAsset {
        asset_tag: "NEW-0001".to_string(),
        status_id: Some(READY),
        assigned_to: Some(HOLDER),
        ..NewAsset::default()
    };
    let asset = app.lifecycle.create_asset(&actor, draft).await.unwrap();
    assert_eq!(asset.assigned_to, Some(HOLDER));
    assert_eq!(asset.last_checkout, Some(app.now));

    let entries = app.entries(asset.id).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action_kind(), Some(ActionKind::Checkout));

    let duplicate = NewAsset {
        asset_tag: "NEW-0001".to_string(),
        ..NewAsset::default()
    };
    let err = app.lifecycle.create_asset(&actor, duplicate).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let broken = NewAsset {
        asset_tag: "NEW-0002".to_string(),
        status_id: Some(BROKEN),
        assigned_to: Some(HOLDER),
        ..NewAsset::default()
    };
    let err = app.lifecycle.create_asset(&actor, broken).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTransition);
    let page = PageRequest::new(1, 50);
    let listed = app
        .lifecycle
        .list_assets(&actor, AssetFilter::All, &page)
        .await
        .unwrap();
    assert!(listed.items.iter().all(|a| a.asset_tag != "NEW-0002"));
}

#[tokio::test]
async fn test_edit_touches_only_present_fields() {
    let app = TestApp::new().await;
    let id = app.add_asset(180, READY).await;
    let actor = app.actor(ADMIN).await;
    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();

    let empty = app
        .lifecycle
        .edit_asset(&actor, id, AssetEdit::default())
        .await
        .unwrap();
    assert_eq!(empty, EditOutcome::NothingToUpdate);
    assert_eq!(app.entries(id).await.len(), 1);

    let edit = AssetEdit {
        patch: AssetPatch {
            order_number: Some("PO-77".to_string()),
            warranty_months: Some(36),
            ..AssetPatch::default()
        },
        name: Some("Renamed".to_string()),
        ..AssetEdit::default()
    };
    let outcome = app.lifecycle.edit_asset(&actor, id, edit).await.unwrap();
    let EditOutcome::Updated { asset, entry } = outcome else {
        panic!("expected an update");
    };
    assert_eq!(asset.order_number.as_deref(), Some("PO-77"));
    assert_eq!(asset.warranty_months, Some(36));
    assert_eq!(asset.name.as_deref(), Some("Renamed"));
    assert_eq!(asset.serial.as_deref(), Some("SN-180"));
    assert_eq!(asset.assigned_to, Some(HOLDER));
    assert_eq!(entry.action, "update");
}

#[tokio::test]
async fn test_edit_rejects_negative_values() {
    let app = TestApp::new().await;
    let id = app.add_asset(185, READY).await;
    let actor = app.actor(ADMIN).await;

    let edit = AssetEdit {
        patch: AssetPatch {
            warranty_months: Some(-1),
            ..AssetPatch::default()
        },
        ..AssetEdit::default()
    };
    let err = app.lifecycle.edit_asset(&actor, id, edit).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.asset(id).await.version, 0);
    assert!(app.entries(id).await.is_empty());
}

#[tokio::test]
async fn test_listing_survives_unclamped_page_request() {
    let app = TestApp::new().await;
    app.add_asset(195, READY).await;
    app.add_asset(196, READY).await;
    let actor = app.actor(ADMIN).await;

    let zero = PageRequest {
        page: 1,
        page_size: 0,
    };
    let listed = app
        .lifecycle
        .list_assets(&actor, AssetFilter::All, &zero)
        .await
        .unwrap();
    assert!(listed.items.is_empty());
    assert_eq!(listed.total_items, 2);

    let far = PageRequest {
        page: u64::MAX,
        page_size: 50,
    };
    let listed = app
        .lifecycle
        .list_assets(&actor, AssetFilter::All, &far)
        .await
        .unwrap();
    assert!(listed.items.is_empty());
}

#[tokio::test]
async fn test_scoped_listing_only_shows_own_company() {
    let app = TestApp::scoped().await;
    app.add_company_asset(190, READY, Some(CompanyId(1))).await;
    app.add_company_asset(191, READY, Some(CompanyId(2))).await;
    app.add_company_asset(192, PENDING, Some(CompanyId(1))).await;

    let page = PageRequest::new(1, 50);
    let holder = app.actor(HOLDER).await;
    let listed = app
        .lifecycle
        .list_assets(&holder, AssetFilter::All, &page)
        .await
        .unwrap();
    let ids: Vec<AssetId> = listed.items.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![AssetId(190), AssetId(192)]);

    let ready = app
        .lifecycle
        .list_assets(&holder, AssetFilter::ReadyToDeploy, &page)
        .await
        .unwrap();
    assert_eq!(ready.items.len(), 1);

    let root = app.actor(UserId(1)).await;
    let everything = app
        .lifecycle
        .list_assets(&root, AssetFilter::All, &page)
        .await
        .unwrap();
    assert_eq!(everything.items.len(), 3);
}
