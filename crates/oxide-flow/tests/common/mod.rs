#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_flow::{step, BoxFuture, BoxedStep, FlowContext, Next};

/// Shared record of what ran, in order.
pub type Trace = Arc<Mutex<Vec<String>>>;

pub fn trace() -> Trace {
    Trace::default()
}

pub fn entries(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

fn record(trace: &Trace, entry: String) {
    trace.lock().unwrap().push(entry);
}

/// Step that records `name:before` and `name:after` around the chain.
pub fn around(trace: &Trace, name: &'static str) -> BoxedStep {
    let trace = Arc::clone(trace);
    step(move |next: Next, ctx: FlowContext| {
        let trace = Arc::clone(&trace);
        async move {
            record(&trace, format!("{name}:before"));
            let ctx = next.run(ctx).await;
            record(&trace, format!("{name}:after"));
            ctx
        }
    })
}

/// Step that records `name:halt`, writes `status`, and never calls next.
pub fn halt(trace: &Trace, name: &'static str, status: u16) -> BoxedStep {
    let trace = Arc::clone(trace);
    step(move |_next: Next, mut ctx: FlowContext| {
        let trace = Arc::clone(&trace);
        async move {
            record(&trace, format!("{name}:halt"));
            ctx.text(status, name);
            ctx
        }
    })
}

/// Handler that records `name` and answers with it.
pub fn handler(
    trace: &Trace,
    name: &'static str,
) -> impl Fn(FlowContext) -> BoxFuture<'static, FlowContext> + Send + Sync + 'static {
    let trace = Arc::clone(trace);
    move |mut ctx: FlowContext| -> BoxFuture<'static, FlowContext> {
        let trace = Arc::clone(&trace);
        Box::pin(async move {
            record(&trace, name.to_string());
            ctx.text(200, name);
            ctx
        })
    }
}

/// Handler that answers with the captured parameters as JSON.
pub async fn echo_params(mut ctx: FlowContext) -> FlowContext {
    let params: serde_json::Map<String, serde_json::Value> = ctx
        .params()
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect();
    ctx.json(200, &params);
    ctx
}

pub async fn ok(ctx: FlowContext) -> FlowContext {
    ctx
}
