use std::sync::Arc;

use serde_json::json;

use crate::common::{StubEngine, TestApp, routes};

fn request_body(budget_id: &str) -> serde_json::Value {
    json!({
        "budget_id": budget_id,
        "project_description": "Full brand identity for a coffee shop",
        "service_type": "design",
        "estimated_total_value": 2000.00,
    })
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn suggestions_are_stamped_with_the_budget_id() {
        let reply = json!([
            {"name": "Logo design", "quantity": 1, "unit_price": 800.00, "total_item_price": 800.00},
            {"name": "Menu layout", "quantity": 2, "unit_price": 600.00, "total_item_price": 1200.00}
        ])
        .to_string();
        let app = TestApp::spawn_with_engine(Arc::new(StubEngine { reply })).await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let budget_id = app.create_budget(&token, "Coffee Shop").await;

        let res = app
            .post_with_token(routes::AI_GENERATE, &request_body(&budget_id), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["budget_id"], budget_id);
        let suggestions = res.body["suggestions"].as_array().unwrap();
        assert_eq!(suggestions.len(), 2);
        for s in suggestions {
            assert_eq!(s["budget_id"], budget_id);
            assert!(s["product_service_id"].is_string());
        }
    }

    #[tokio::test]
    async fn markdown_fenced_replies_are_accepted() {
        let inner = json!([
            {"name": "Logo design", "quantity": 1, "unit_price": 800.00, "total_item_price": 800.00}
        ]);
        let reply = format!("```json\n{inner}\n```");
        let app = TestApp::spawn_with_engine(Arc::new(StubEngine { reply })).await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let budget_id = app.create_budget(&token, "Coffee Shop").await;

        let res = app
            .post_with_token(routes::AI_GENERATE, &request_body(&budget_id), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["suggestions"][0]["name"], "Logo design");
    }

    #[tokio::test]
    async fn unparseable_reply_surfaces_with_the_raw_payload() {
        let reply = "Sure! Here are some ideas for your budget:".to_string();
        let app = TestApp::spawn_with_engine(Arc::new(StubEngine {
            reply: reply.clone(),
        }))
        .await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let budget_id = app.create_budget(&token, "Coffee Shop").await;

        let res = app
            .post_with_token(routes::AI_GENERATE, &request_body(&budget_id), &token)
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "UPSTREAM_FORMAT");
        assert_eq!(res.body["raw"], reply);
    }

    #[tokio::test]
    async fn nothing_is_persisted_by_a_generation_call() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let budget_id = app.create_budget(&token, "Coffee Shop").await;

        let res = app
            .post_with_token(routes::AI_GENERATE, &request_body(&budget_id), &token)
            .await;
        assert_eq!(res.status, 200);

        let items = app
            .get_with_token(&routes::budget_items_of(&budget_id), &token)
            .await;
        assert_eq!(items.body.as_array().unwrap().len(), 0);

        let budget = app.get_with_token(&routes::budget(&budget_id), &token).await;
        assert_eq!(budget.body["total_value"], "0.00");
    }
}

mod validation_and_ownership {
    use super::*;

    #[tokio::test]
    async fn empty_project_description_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let budget_id = app.create_budget(&token, "Coffee Shop").await;

        let res = app
            .post_with_token(
                routes::AI_GENERATE,
                &json!({
                    "budget_id": budget_id,
                    "project_description": "   ",
                    "service_type": "design",
                    "estimated_total_value": 2000.00,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_positive_estimated_value_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice@example.com").await;
        let budget_id = app.create_budget(&token, "Coffee Shop").await;

        let res = app
            .post_with_token(
                routes::AI_GENERATE,
                &json!({
                    "budget_id": budget_id,
                    "project_description": "Brand identity",
                    "service_type": "design",
                    "estimated_total_value": 0,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn another_users_budget_cannot_be_targeted() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice@example.com").await;
        let bob = app.create_authenticated_user("bob@example.com").await;
        let budget_id = app.create_budget(&alice, "Coffee Shop").await;

        let res = app
            .post_with_token(routes::AI_GENERATE, &request_body(&budget_id), &bob)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
