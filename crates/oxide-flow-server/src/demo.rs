//! Demo application.
//!
//! Routes:
//! - `GET  /`                 - welcome message with a context value
//! - `GET  /api/user/:id`     - path parameter
//! - `GET  /api/users`        - JSON array
//!
//! Everything under `/api` carries permissive CORS headers.
//! - `POST /api/auth/login`   - `X-Auth` check and JSON body binding
//! - `GET  /files/*`          - wildcard
//! - `GET  /admin/plain/ping` - cleared branch, no global steps

use oxide_flow::{
    step, Cors, Flow, FlowContext, Logger, Next, RequireHeader, Router, SetHeader, Step,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;

/// Builds the demo router.
///
/// # Errors
///
/// Returns an error if a route fails to register.
pub fn router() -> Result<Router> {
    let flow = Flow::new();
    {
        let root = flow.fork(
            "/",
            [
                Logger.boxed(),
                SetHeader::new("X-App", "oxide-flow").boxed(),
                step(set_app_name),
                step(processed_at),
            ],
        );
        root.get("/", [], welcome)?;

        let api = root.fork("/api", [Cors::permissive().boxed(), step(set_version)]);
        api.get("/user/:id", [], user)?;
        api.get("/users", [], users)?;

        let auth = api.fork("/auth", []).clear_steps();
        auth.post(
            "/login",
            [RequireHeader::equals("X-Auth", "secret").boxed()],
            login,
        )?;

        root.get("/files/*", [], files)?;

        let admin = root.fork("/admin", [step(admin_check)]);
        let plain = admin.fork("/plain", []).clear_steps();
        plain.get("/ping", [], ping)?;
    }
    Ok(flow.into_router())
}

async fn set_app_name(next: Next, mut ctx: FlowContext) -> FlowContext {
    ctx.set("appName", "oxide-flow demo".to_string());
    next.run(ctx).await
}

async fn processed_at(next: Next, ctx: FlowContext) -> FlowContext {
    let mut ctx = next.run(ctx).await;
    ctx.set_header("X-Processed-At", chrono::Utc::now().to_rfc3339());
    ctx
}

async fn set_version(next: Next, mut ctx: FlowContext) -> FlowContext {
    ctx.set("version", "v1".to_string());
    next.run(ctx).await
}

async fn admin_check(next: Next, mut ctx: FlowContext) -> FlowContext {
    ctx.set("admin-check", true);
    next.run(ctx).await
}

async fn welcome(mut ctx: FlowContext) -> FlowContext {
    let app = ctx.get::<String>("appName").cloned();
    ctx.json(200, &json!({"message": "Welcome to oxide-flow!", "app": app}));
    ctx
}

async fn user(mut ctx: FlowContext) -> FlowContext {
    let body = json!({
        "user_id": ctx.param("id"),
        "version": ctx.get::<String>("version"),
    });
    ctx.json(200, &body);
    ctx
}

async fn users(mut ctx: FlowContext) -> FlowContext {
    let users = [
        json!({"id": "1", "name": "Alice"}),
        json!({"id": "2", "name": "Bob"}),
    ];
    ctx.json(200, &json!({"count": users.len(), "users": users}));
    ctx
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    #[allow(dead_code)]
    password: String,
}

async fn login(mut ctx: FlowContext) -> FlowContext {
    let Ok(payload) = ctx.bind_json::<LoginPayload>() else {
        return ctx;
    };
    ctx.json(200, &json!({"status": "ok", "user": payload.username}));
    ctx
}

async fn files(mut ctx: FlowContext) -> FlowContext {
    let path = ctx.request.path.clone();
    ctx.json(200, &json!({"path": path}));
    ctx
}

async fn ping(mut ctx: FlowContext) -> FlowContext {
    let body = json!({
        "ping": "pong",
        "admin-check": ctx.get::<bool>("admin-check"),
        "globalHeader": ctx.response.get_header("X-App"),
    });
    ctx.json(200, &body);
    ctx
}
