//! Integration tests for asset attachments.

mod helpers;

use bytes::Bytes;

use assettrack_core::error::ErrorKind;
use assettrack_core::traits::AttachmentStorage;
use assettrack_core::types::id::AuditLogId;
use assettrack_service::{CheckoutRequest, UploadRequest};

use helpers::{ADMIN, HOLDER, READY, TestApp};

fn receipt() -> UploadRequest {
    UploadRequest {
        original_name: "Purchase Receipt.PDF".to_string(),
        data: Bytes::from_static(b"%PDF-1.7 receipt"),
        note: Some("scanned".to_string()),
    }
}

#[tokio::test]
async fn test_upload_fetch_and_delete() {
    let app = TestApp::new().await;
    let id = app.add_asset(300, READY).await;
    let actor = app.actor(ADMIN).await;

    let entry = app.lifecycle.upload_file(&actor, id, receipt()).await.unwrap();
    let filename = entry.filename.clone().expect("stored name");
    assert!(filename.starts_with("hardware-300-"));
    assert!(filename.ends_with("-purchase-receipt.pdf"));
    assert_eq!(entry.action, "uploaded");
    assert_eq!(entry.note.as_deref(), Some("scanned"));
    assert!(app.storage.exists(&filename).await.unwrap());

    let attachment = app
        .lifecycle
        .fetch_upload(&actor, id, entry.id)
        .await
        .unwrap();
    assert_eq!(attachment.filename, filename);
    assert_eq!(attachment.data, Bytes::from_static(b"%PDF-1.7 receipt"));

    app.lifecycle
        .delete_upload(&actor, id, entry.id)
        .await
        .unwrap();
    assert!(!app.storage.exists(&filename).await.unwrap());
    assert!(app.audit.history(&actor, id).await.unwrap().is_empty());

    let hidden = app.entries(id).await;
    assert_eq!(hidden.len(), 1);
    assert!(hidden[0].deleted_at.is_some());

    let err = app
        .lifecycle
        .fetch_upload(&actor, id, entry.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_upload_entry_must_belong_to_asset() {
    let app = TestApp::new().await;
    let first = app.add_asset(310, READY).await;
    let second = app.add_asset(311, READY).await;
    let actor = app.actor(ADMIN).await;

    let entry = app
        .lifecycle
        .upload_file(&actor, first, receipt())
        .await
        .unwrap();

    let err = app
        .lifecycle
        .fetch_upload(&actor, second, entry.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .lifecycle
        .delete_upload(&actor, second, entry.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .lifecycle
        .fetch_upload(&actor, first, AuditLogId(9_999))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_non_upload_entries_are_not_attachments() {
    let app = TestApp::new().await;
    let id = app.add_asset(320, READY).await;
    let actor = app.actor(ADMIN).await;
    let checkout = app
        .lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER))
        .await
        .unwrap();

    let err = app
        .lifecycle
        .delete_upload(&actor, id, checkout.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(app.entries(id).await[0].deleted_at.is_none());
}

#[tokio::test]
async fn test_failed_audit_write_removes_stored_file() {
    let app = TestApp::new().await;
    let id = app.add_asset(330, READY).await;
    let actor = app.actor(ADMIN).await;
    app.store.fail_audit_writes_for(id).await;

    let err = app
        .lifecycle
        .upload_file(&actor, id, receipt())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Persistence);

    let mut stored = tokio::fs::read_dir(app.storage.root()).await.unwrap();
    assert!(stored.next_entry().await.unwrap().is_none());
    assert!(app.entries(id).await.is_empty());
}

#[tokio::test]
async fn test_failed_delete_keeps_file_and_entry() {
    let app = TestApp::new().await;
    let id = app.add_asset(335, READY).await;
    let actor = app.actor(ADMIN).await;
    let entry = app.lifecycle.upload_file(&actor, id, receipt()).await.unwrap();
    let filename = entry.filename.clone().expect("stored name");
    app.store.fail_audit_writes_for(id).await;

    let err = app
        .lifecycle
        .delete_upload(&actor, id, entry.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Persistence);
    assert!(app.storage.exists(&filename).await.unwrap());
    assert!(app.entries(id).await[0].deleted_at.is_none());

    let attachment = app
        .lifecycle
        .fetch_upload(&actor, id, entry.id)
        .await
        .unwrap();
    assert_eq!(attachment.filename, filename);
}

#[tokio::test]
async fn test_upload_rejects_nameless_file_and_deleted_asset() {
    let app = TestApp::new().await;
    let id = app.add_asset(340, READY).await;
    let actor = app.actor(ADMIN).await;

    let nameless = UploadRequest {
        original_name: "  ".to_string(),
        ..receipt()
    };
    let err = app
        .lifecycle
        .upload_file(&actor, id, nameless)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    app.lifecycle.soft_delete(&actor, id).await.unwrap();
    let err = app
        .lifecycle
        .upload_file(&actor, id, receipt())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let app = TestApp::new().await;
    let id = app.add_asset(350, READY).await;
    let actor = app.actor(ADMIN).await;

    app.lifecycle
        .checkout(&actor, id, CheckoutRequest::to(HOLDER).at("2024-01-10 00:00:00"))
        .await
        .unwrap();
    app.lifecycle
        .upload_file(&actor, id, receipt())
        .await
        .unwrap();
    app.lifecycle
        .checkin(&actor, id, Default::default())
        .await
        .unwrap();

    let history = app.audit.history(&actor, id).await.unwrap();
    let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["checkin from", "uploaded", "checkout"]);
    assert!(history[0].id > history[1].id);
}
