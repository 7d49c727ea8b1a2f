use crate::common::{TestApp, routes};

#[tokio::test]
async fn exports_a_budget_as_a_pdf_document() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice@example.com").await;
    let budget_id = app.create_budget(&token, "Acme Corp").await;
    app.create_budget_item(&token, &budget_id, "Logo design", 1.0, 500.0)
        .await;
    app.create_budget_item(&token, &budget_id, "Business cards", 2.0, 25.0)
        .await;

    let (status, headers, bytes) = app
        .get_bytes_with_token(&routes::budget_pdf(&budget_id), &token)
        .await;

    assert_eq!(status, 200);
    assert_eq!(
        headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    let disposition = headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(disposition.contains(&budget_id), "got: {disposition}");
    assert!(bytes.starts_with(b"%PDF"), "body is not a PDF");
}

#[tokio::test]
async fn exports_an_empty_budget_without_items() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice@example.com").await;
    let budget_id = app.create_budget(&token, "Acme Corp").await;

    let (status, _, bytes) = app
        .get_bytes_with_token(&routes::budget_pdf(&budget_id), &token)
        .await;

    assert_eq!(status, 200);
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn handles_budgets_with_many_items_across_pages() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice@example.com").await;
    let budget_id = app.create_budget(&token, "Acme Corp").await;

    for i in 0..60 {
        app.create_budget_item(&token, &budget_id, &format!("Line {i}"), 1.0, 10.0)
            .await;
    }

    let (status, _, bytes) = app
        .get_bytes_with_token(&routes::budget_pdf(&budget_id), &token)
        .await;

    assert_eq!(status, 200);
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn another_users_budget_cannot_be_exported() {
    let app = TestApp::spawn().await;
    let alice = app.create_authenticated_user("alice@example.com").await;
    let bob = app.create_authenticated_user("bob@example.com").await;
    let budget_id = app.create_budget(&alice, "Acme Corp").await;

    let (status, _, _) = app
        .get_bytes_with_token(&routes::budget_pdf(&budget_id), &bob)
        .await;

    assert_eq!(status, 404);
}
