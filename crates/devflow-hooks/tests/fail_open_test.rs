//! Integration tests for failure containment.

mod helpers;

use std::sync::Arc;

use devflow_hooks::{FailOpen, HookContext, HookManager, HookType, RegisterOptions};

async fn dispatch(manager: &HookManager) -> HookContext {
    manager
        .dispatch(HookType::PostToolUse, HookContext::new(HookType::PostToolUse))
        .await
}

#[tokio::test]
async fn test_guarded_failure_before_next_still_runs_downstream() {
    let manager = HookManager::new();
    let trace = helpers::trace();

    manager
        .register_guarded(
            HookType::PostToolUse,
            Arc::new(helpers::FailsBeforeNext),
            RegisterOptions::new("broken").priority(1),
        )
        .await
        .unwrap();
    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("downstream", &trace),
            RegisterOptions::new("downstream").priority(2),
        )
        .await
        .unwrap();

    dispatch(&manager).await;

    assert_eq!(
        helpers::entries(&trace),
        vec!["pre:downstream", "post:downstream"]
    );
}

#[tokio::test]
async fn test_guarded_panic_is_contained() {
    let manager = HookManager::new();
    let trace = helpers::trace();

    manager
        .register(
            HookType::PostToolUse,
            FailOpen::wrap("panicky", Arc::new(helpers::PanicsBeforeNext)),
            RegisterOptions::new("panicky").priority(1),
        )
        .await
        .unwrap();
    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("downstream", &trace),
            RegisterOptions::new("downstream").priority(2),
        )
        .await
        .unwrap();

    dispatch(&manager).await;

    assert_eq!(
        helpers::entries(&trace),
        vec!["pre:downstream", "post:downstream"]
    );
}

#[tokio::test]
async fn test_guarded_failure_after_next_does_not_rerun_downstream() {
    let manager = HookManager::new();
    let trace = helpers::trace();

    manager
        .register_guarded(
            HookType::PostToolUse,
            Arc::new(helpers::FailsAfterNext {
                trace: trace.clone(),
            }),
            RegisterOptions::new("late").priority(1),
        )
        .await
        .unwrap();
    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("downstream", &trace),
            RegisterOptions::new("downstream").priority(2),
        )
        .await
        .unwrap();

    dispatch(&manager).await;

    assert_eq!(
        helpers::entries(&trace),
        vec!["pre:downstream", "post:downstream", "after-next"]
    );
}

#[tokio::test]
async fn test_outer_handler_unwinds_around_contained_failure() {
    let manager = HookManager::new();
    let trace = helpers::trace();

    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("outer", &trace),
            RegisterOptions::new("outer").priority(1),
        )
        .await
        .unwrap();
    manager
        .register_guarded(
            HookType::PostToolUse,
            Arc::new(helpers::FailsBeforeNext),
            RegisterOptions::new("broken").priority(2),
        )
        .await
        .unwrap();
    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("inner", &trace),
            RegisterOptions::new("inner").priority(3),
        )
        .await
        .unwrap();

    dispatch(&manager).await;

    assert_eq!(
        helpers::entries(&trace),
        vec!["pre:outer", "pre:inner", "post:inner", "post:outer"]
    );
}

#[tokio::test]
async fn test_unguarded_failure_stops_chain_but_dispatch_returns() {
    let manager = HookManager::new();
    let trace = helpers::trace();

    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("outer", &trace),
            RegisterOptions::new("outer").priority(1),
        )
        .await
        .unwrap();
    manager
        .register(
            HookType::PostToolUse,
            Arc::new(helpers::PanicsBeforeNext),
            RegisterOptions::new("panicky").priority(2),
        )
        .await
        .unwrap();
    manager
        .register(
            HookType::PostToolUse,
            helpers::Recorder::handler("never", &trace),
            RegisterOptions::new("never").priority(3),
        )
        .await
        .unwrap();

    dispatch(&manager).await;

    assert_eq!(helpers::entries(&trace), vec!["pre:outer", "post:outer"]);
}
