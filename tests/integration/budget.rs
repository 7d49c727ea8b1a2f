use serde_json::json;

use crate::common::{TestApp, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn new_budget_starts_as_an_empty_draft() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app
            .post_with_token(
                routes::BUDGETS,
                &json!({"client_name": "Acme Corp", "client_email": "contact@acme.example"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["client_name"], "Acme Corp");
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["total_value"], "0.00");
        assert_eq!(res.body["has_watermark"], true);
    }

    #[tokio::test]
    async fn list_returns_own_budgets_newest_first() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        app.create_budget(&token, "First Client").await;
        app.create_budget(&token, "Second Client").await;

        let res = app.get_with_token(routes::BUDGETS, &token).await;

        assert_eq!(res.status, 200);
        let budgets = res.body.as_array().expect("list should be an array");
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0]["client_name"], "Second Client");
        assert_eq!(budgets[1]["client_name"], "First Client");
    }

    #[tokio::test]
    async fn list_excludes_other_users_budgets() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice@example.com").await;
        let bob = app.create_authenticated_user("bob@example.com").await;

        app.create_budget(&alice, "Acme Corp").await;

        let res = app.get_with_token(routes::BUDGETS, &bob).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn partial_update_changes_only_provided_fields() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.create_budget(&token, "Acme Corp").await;

        let res = app
            .put_with_token(
                &routes::budget(&id),
                &json!({"status": "pending", "notes": "Waiting for approval"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["notes"], "Waiting for approval");
        assert_eq!(res.body["client_name"], "Acme Corp");
    }

    #[tokio::test]
    async fn empty_update_payload_returns_resource_unchanged() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.create_budget(&token, "Acme Corp").await;

        let res = app.put_with_token(&routes::budget(&id), &json!({}), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["client_name"], "Acme Corp");
        assert_eq!(res.body["status"], "draft");
    }

    #[tokio::test]
    async fn invalid_status_value_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.create_budget(&token, "Acme Corp").await;

        let res = app
            .put_with_token(&routes::budget(&id), &json!({"status": "frozen"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn delete_removes_the_budget_and_its_items() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let id = app.create_budget(&token, "Acme Corp").await;
        let item_id = app
            .create_budget_item(&token, &id, "Logo design", 1.0, 500.0)
            .await;

        let res = app.delete_with_token(&routes::budget(&id), &token).await;
        assert_eq!(res.status, 204);

        let budget_gone = app.get_with_token(&routes::budget(&id), &token).await;
        assert_eq!(budget_gone.status, 404);

        let item_gone = app.get_with_token(&routes::budget_item(&item_id), &token).await;
        assert_eq!(item_gone.status, 404);
    }
}

mod path_parsing {
    use super::*;

    #[tokio::test]
    async fn malformed_budget_id_in_path_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;

        let res = app
            .get_with_token(&routes::budget("not-a-uuid"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn another_users_budget_reads_as_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice@example.com").await;
        let bob = app.create_authenticated_user("bob@example.com").await;
        let id = app.create_budget(&alice, "Acme Corp").await;

        let get = app.get_with_token(&routes::budget(&id), &bob).await;
        assert_eq!(get.status, 404);
        assert_eq!(get.body["code"], "NOT_FOUND");

        let update = app
            .put_with_token(&routes::budget(&id), &json!({"status": "approved"}), &bob)
            .await;
        assert_eq!(update.status, 404);

        let delete = app.delete_with_token(&routes::budget(&id), &bob).await;
        assert_eq!(delete.status, 404);

        let still_there = app.get_with_token(&routes::budget(&id), &alice).await;
        assert_eq!(still_there.status, 200);
    }
}
