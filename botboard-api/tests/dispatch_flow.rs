//! Integration tests for webhook dispatch
//!
//! A local receiver stands in for bot endpoints; one of its routes sleeps
//! past the dispatcher's timeout to exercise failure isolation.

mod common;

use axum::http::StatusCode;
use botboard_shared::models::bot::Bot;
use botboard_shared::models::bot_webhook::BotWebhook;
use botboard_shared::models::button::Visibility;
use botboard_shared::models::user::Role;
use common::{request, send, start_receiver, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_trigger_all_fans_out_and_isolates_failures() {
    let ctx = TestContext::new().await.unwrap();
    let receiver = start_receiver().await.unwrap();

    let button = ctx.seed_button("Hall", Visibility::Public).await.unwrap();
    let bot1 = ctx.default_bot().await.unwrap();
    let bot2 = Bot::create(&ctx.db, "Bot 2", None).await.unwrap();

    // Bot 1 answers; Bot 2 sleeps past the dispatcher's timeout.
    BotWebhook::upsert(&ctx.db, bot1.id, button.id, &receiver.hook_url())
        .await
        .unwrap();
    BotWebhook::upsert(&ctx.db, bot2.id, button.id, &receiver.slow_url())
        .await
        .unwrap();

    let admin = ctx.seed_user("admin@example.com", Role::Admin, true).await.unwrap();
    let cookie = ctx.session_for(&admin).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&cookie),
            Some(json!({ "botId": "all" })),
        ),
    )
    .await;

    // Dispatch was attempted for both destinations; Bot 2's timeout is
    // captured, not surfaced.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Button \"Hall\" activated for 2 bot(s)!");

    // Bot 1 received the payload with the expected wire format.
    let hits = receiver.hits().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["buttonId"], button.id);
    assert_eq!(hits[0]["buttonTitle"], "Hall");
    assert_eq!(hits[0]["triggeredBy"], "admin@example.com");
    assert_eq!(hits[0]["botId"], bot1.id);
    assert_eq!(hits[0]["botName"], "Bot 1");
    assert!(hits[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_trigger_all_with_nothing_configured() {
    let ctx = TestContext::new().await.unwrap();

    let button = ctx.seed_button("Hall", Visibility::Public).await.unwrap();
    let admin = ctx.seed_user("admin@example.com", Role::Admin, true).await.unwrap();
    let cookie = ctx.session_for(&admin).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&cookie),
            Some(json!({ "botId": "all" })),
        ),
    )
    .await;

    // A non-error outcome: nothing was configured, nothing was called.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No webhooks configured for this button");
}

#[tokio::test]
async fn test_trigger_single_bot_delivers() {
    let ctx = TestContext::new().await.unwrap();
    let receiver = start_receiver().await.unwrap();

    let button = ctx.seed_button("Hall", Visibility::Public).await.unwrap();
    let bot = ctx.default_bot().await.unwrap();
    BotWebhook::upsert(&ctx.db, bot.id, button.id, &receiver.hook_url())
        .await
        .unwrap();

    let user = ctx.seed_user("user@example.com", Role::User, true).await.unwrap();
    let cookie = ctx.session_for(&user).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&cookie),
            Some(json!({ "botId": bot.id.to_string() })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Button \"Hall\" activated for Bot 1!");

    let hits = receiver.hits().await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["triggeredBy"], "user@example.com");
}

#[tokio::test]
async fn test_trigger_single_bot_not_configured() {
    let ctx = TestContext::new().await.unwrap();

    let button = ctx.seed_button("Hall", Visibility::Public).await.unwrap();
    let bot = ctx.default_bot().await.unwrap();
    // A blank URL counts as not configured.
    BotWebhook::upsert(&ctx.db, bot.id, button.id, "  ").await.unwrap();

    let admin = ctx.seed_user("admin@example.com", Role::Admin, true).await.unwrap();
    let cookie = ctx.session_for(&admin).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&cookie),
            Some(json!({ "botId": bot.id.to_string() })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Webhook not configured for this bot");
}

#[tokio::test]
async fn test_trigger_single_bot_swallows_delivery_failure() {
    let ctx = TestContext::new().await.unwrap();

    let button = ctx.seed_button("Hall", Visibility::Public).await.unwrap();
    let bot = ctx.default_bot().await.unwrap();
    // Nothing listens on port 1: the delivery fails at the network layer.
    BotWebhook::upsert(&ctx.db, bot.id, button.id, "http://127.0.0.1:1/hook")
        .await
        .unwrap();

    let admin = ctx.seed_user("admin@example.com", Role::Admin, true).await.unwrap();
    let cookie = ctx.session_for(&admin).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&cookie),
            Some(json!({ "botId": bot.id.to_string() })),
        ),
    )
    .await;

    // The action was processed; the failed delivery is logged, not raised.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_private_button_gated_by_role() {
    let ctx = TestContext::new().await.unwrap();
    let receiver = start_receiver().await.unwrap();

    let button = ctx.seed_button("Vault", Visibility::Private).await.unwrap();
    let bot = ctx.default_bot().await.unwrap();
    BotWebhook::upsert(&ctx.db, bot.id, button.id, &receiver.hook_url())
        .await
        .unwrap();

    let user = ctx.seed_user("user@example.com", Role::User, true).await.unwrap();
    let user_cookie = ctx.session_for(&user).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&user_cookie),
            Some(json!({ "botId": "all" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert!(receiver.hits().await.is_empty());

    // Admin and owner may trigger the same button.
    let admin = ctx.seed_user("admin@example.com", Role::Admin, true).await.unwrap();
    let admin_cookie = ctx.session_for(&admin).await;

    let (status, body) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&admin_cookie),
            Some(json!({ "botId": "all" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(receiver.hits().await.len(), 1);
}

#[tokio::test]
async fn test_trigger_unknown_button_and_bad_selector() {
    let ctx = TestContext::new().await.unwrap();

    let admin = ctx.seed_user("admin@example.com", Role::Admin, true).await.unwrap();
    let cookie = ctx.session_for(&admin).await;

    let (status, _) = send(
        &ctx,
        request(
            "POST",
            "/trigger-webhook/9999",
            Some(&cookie),
            Some(json!({ "botId": "all" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let button = ctx.seed_button("Hall", Visibility::Public).await.unwrap();
    let (status, _) = send(
        &ctx,
        request(
            "POST",
            &format!("/trigger-webhook/{}", button.id),
            Some(&cookie),
            Some(json!({ "botId": "seven" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
