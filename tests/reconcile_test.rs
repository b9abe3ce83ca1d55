//! Viewport reconciliation: guards, redirects, defaults and nested scopes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use viewport_router::config::ViewportConfig;
use viewport_router::instruction::ViewportInstruction;
use viewport_router::navigation::NavigationInstruction;
use viewport_router::router::{NavRoute, RouteTransformer, Transformed};
use viewport_router::viewport::ViewportOptions;
use viewport_router::{RouterError, RouterOptions};

mod common;
use common::{config, eventually, fixture, fixture_with, viewport, Behaviour, Components};

fn scoped(name: &str) -> ViewportConfig {
    ViewportConfig {
        scope: true,
        ..viewport(name)
    }
}

fn panes() -> Vec<(&'static str, ViewportOptions)> {
    vec![("left", ViewportOptions::default()), ("right", ViewportOptions::default())]
}

#[tokio::test]
async fn test_refused_leave_rolls_back_every_viewport() {
    let f = fixture(
        config(vec![viewport("left"), viewport("right")]),
        Components::new().plain(&["a", "c", "d"]).with("b", Behaviour::locked()),
    );
    f.router.goto("a@left+b@right", None, None).await.unwrap();

    // Cancellation still settles the request successfully.
    f.router.goto("c@left+d@right", None, None).await.unwrap();

    assert_eq!(f.shown("left").as_deref(), Some("a"));
    assert_eq!(f.shown("right").as_deref(), Some("b"));
    assert_eq!(f.recorder.count("c:enter"), 0);
    assert_eq!(f.recorder.count("a:leave"), 0);
    assert_eq!(f.paths(), vec!["a@left+b@right"]);
    assert!(!f.router.is_navigating());
}

#[tokio::test]
async fn test_refused_enter_keeps_current_content() {
    let f = fixture(
        config(vec![viewport("main")]),
        Components::new().plain(&["a"]).with("closed", Behaviour::rejecting()),
    );
    f.router.goto("a@main", None, None).await.unwrap();
    f.router.goto("closed(7)@main", None, None).await.unwrap();

    assert_eq!(f.shown("main").as_deref(), Some("a"));
    assert_eq!(f.recorder.count("closed:canEnter[\"7\"]"), 1);
    assert_eq!(f.recorder.count("closed:enter"), 0);
    assert_eq!(f.recorder.count("a:leave"), 0);
}

#[tokio::test]
async fn test_enter_guard_redirects() {
    let login = ViewportInstruction::new("login").with_parameters("admin").in_viewport("main");
    let f = fixture(
        config(vec![viewport("main")]),
        Components::new()
            .plain(&["login"])
            .with("admin", Behaviour::redirecting(vec![login])),
    );

    f.router.goto("admin@main", None, None).await.unwrap();

    assert_eq!(f.shown("main").as_deref(), Some("login(admin)"));
    assert_eq!(f.path().as_deref(), Some("login(admin)@main"));
    assert_eq!(f.recorder.count("admin:enter"), 0);
    assert_eq!(f.recorder.count("login:enter"), 1);
}

#[tokio::test]
async fn test_circular_redirects_exhaust_the_guard() {
    let mut cfg = config(vec![viewport("main")]);
    cfg.navigation.guard_limit = 10;
    let f = fixture(
        cfg,
        Components::new()
            .plain(&["plain"])
            .with("ping", Behaviour::redirecting(vec![ViewportInstruction::new("pong").in_viewport("main")]))
            .with("pong", Behaviour::redirecting(vec![ViewportInstruction::new("ping").in_viewport("main")])),
    );

    let result = f.router.goto("ping@main", None, None).await;
    assert!(matches!(result, Err(RouterError::GuardExhausted(10))));
    assert_eq!(f.shown("main"), None);
    assert!(f.router.navigator().entries().is_empty());

    // The queue moves on.
    f.router.goto("plain@main", None, None).await.unwrap();
    assert_eq!(f.shown("main").as_deref(), Some("plain"));
}

#[tokio::test]
async fn test_failing_hook_rejects_the_request() {
    let f = fixture(
        config(vec![viewport("main")]),
        Components::new().plain(&["a", "b"]).with(
            "boom",
            Behaviour {
                fail_enter: true,
                ..Default::default()
            },
        ),
    );
    f.router.goto("a@main", None, None).await.unwrap();

    let result = f.router.goto("boom@main", None, None).await;
    assert!(matches!(result, Err(RouterError::Hook { hook: "enter", .. })));
    assert_eq!(f.shown("main").as_deref(), Some("a"));
    assert!(!f.router.is_navigating());

    f.router.goto("b@main", None, None).await.unwrap();
    assert_eq!(f.paths(), vec!["a@main", "b@main"]);
}

#[tokio::test]
async fn test_slow_guard_times_out() {
    let mut cfg = config(vec![viewport("main")]);
    cfg.navigation.guard_timeout_ms = 20;
    let f = fixture(
        cfg,
        Components::new().with(
            "slow",
            Behaviour {
                delay: Some(Duration::from_millis(500)),
                ..Default::default()
            },
        ),
    );

    let result = f.router.goto("slow@main", None, None).await;
    assert!(matches!(
        result,
        Err(RouterError::GuardTimeout { hook: "canEnter", timeout_ms: 20, .. })
    ));
    assert_eq!(f.shown("main"), None);
}

#[tokio::test]
async fn test_unknown_component_fails() {
    let f = fixture(config(vec![viewport("main")]), Components::new());
    let result = f.router.goto("ghost@main", None, None).await;
    assert!(matches!(result, Err(RouterError::UnknownComponent(name)) if name == "ghost"));
}

#[tokio::test]
async fn test_panicking_guard_rejects_and_the_router_recovers() {
    let f = fixture(
        config(vec![viewport("main")]),
        Components::new().plain(&["a", "b"]).with(
            "broken",
            Behaviour {
                panic_can_enter: true,
                ..Default::default()
            },
        ),
    );
    f.router.goto("a@main", None, None).await.unwrap();

    let result = f.router.goto("broken@main", None, None).await;
    assert!(matches!(result, Err(RouterError::Panicked(message)) if message.contains("guard bug")));
    assert_eq!(f.shown("main").as_deref(), Some("a"));
    assert!(!f.router.is_navigating());

    f.router.goto("b@main", None, None).await.unwrap();
    assert_eq!(f.shown("main").as_deref(), Some("b"));
    assert_eq!(f.paths(), vec!["a@main", "b@main"]);
}

#[tokio::test]
async fn test_overwritten_entered_content_is_left() {
    let f = fixture(
        config(vec![viewport("main"), viewport("side")]),
        Components::new()
            .plain(&["a", "b"])
            .with("r", Behaviour::redirecting(vec![ViewportInstruction::new("b").in_viewport("main")])),
    );

    f.router.goto("a@main+r@side", None, None).await.unwrap();

    assert_eq!(f.shown("main").as_deref(), Some("b"));
    assert_eq!(f.recorder.count("a:enter"), 1);
    assert_eq!(f.recorder.count("a:leave"), 1);
    assert_eq!(f.recorder.count("b:enter"), 1);
    assert!(!f.router.is_navigating());
}

#[tokio::test]
async fn test_empty_viewports_get_their_default() {
    let main = ViewportConfig {
        default: Some("home".into()),
        ..viewport("main")
    };
    let f = fixture(config(vec![main, viewport("side")]), Components::new().plain(&["home", "x"]));

    f.router.goto("x@side", None, None).await.unwrap();

    assert_eq!(f.shown("main").as_deref(), Some("home"));
    assert_eq!(f.shown("side").as_deref(), Some("x"));
    assert_eq!(f.path().as_deref(), Some("home@main+x@side"));
}

#[tokio::test]
async fn test_unnamed_instruction_prefers_used_by() {
    let side = ViewportConfig {
        used_by: vec!["menu".into()],
        ..viewport("side")
    };
    let f = fixture(config(vec![viewport("main"), side]), Components::new().plain(&["menu"]));

    f.router.goto("menu", None, None).await.unwrap();

    assert_eq!(f.shown("side").as_deref(), Some("menu"));
    assert_eq!(f.shown("main"), None);
}

#[tokio::test]
async fn test_nested_instructions_fill_child_scope() {
    let f = fixture(
        config(vec![scoped("main")]),
        Components::new().plain(&["list", "detail", "other"]).hosting("shell", &panes()),
    );

    f.router
        .goto("shell@main/(list@left+detail(3)@right)", None, None)
        .await
        .unwrap();
    assert_eq!(f.shown("left").as_deref(), Some("list"));
    assert_eq!(f.shown("right").as_deref(), Some("detail(3)"));
    assert_eq!(f.path().as_deref(), Some("shell@main/(list@left+detail(3)@right)"));

    f.router
        .goto("shell@main/(list@left+detail(4)@right)", None, None)
        .await
        .unwrap();
    assert_eq!(f.shown("right").as_deref(), Some("detail(4)"));
    assert_eq!(f.recorder.count("shell:enter"), 1);
    assert_eq!(f.recorder.count("list:enter"), 1);

    f.router.back().await.unwrap();
    assert_eq!(f.shown("right").as_deref(), Some("detail(3)"));
    assert_eq!(f.shown("left").as_deref(), Some("list"));

    f.router.goto("other@main", None, None).await.unwrap();
    assert_eq!(f.path().as_deref(), Some("other@main"));
    assert!(f.router.get_viewport("left").is_none());
    assert!(f.router.get_viewport("right").is_none());
}

#[tokio::test]
async fn test_sibling_waits_for_declared_viewport() {
    let f = fixture(
        config(vec![viewport("main")]),
        Components::new()
            .plain(&["x"])
            .hosting("frame", &[("inner", ViewportOptions::default())]),
    );

    f.router.goto("frame@main+x@inner", None, None).await.unwrap();

    assert_eq!(f.shown("main").as_deref(), Some("frame"));
    assert_eq!(f.shown("inner").as_deref(), Some("x"));
    assert_eq!(f.path().as_deref(), Some("frame@main+x@inner"));
}

#[tokio::test]
async fn test_clear_prefix_empties_unmentioned_viewports() {
    let f = fixture(
        config(vec![viewport("left"), viewport("right")]),
        Components::new().plain(&["a", "b", "c"]),
    );
    f.router.goto("a@left+b@right", None, None).await.unwrap();

    f.router.goto("-+c@left", None, None).await.unwrap();
    assert_eq!(f.shown("left").as_deref(), Some("c"));
    assert_eq!(f.shown("right"), None);
    assert_eq!(f.recorder.count("b:leave"), 1);

    f.router.goto("-", None, None).await.unwrap();
    assert_eq!(f.shown("left"), None);
    assert_eq!(f.path().as_deref(), Some(""));
}

#[tokio::test]
async fn test_links_resolve_against_their_scope() {
    let f = fixture(
        config(vec![scoped("main")]),
        Components::new().plain(&["list", "detail", "home"]).hosting("shell", &panes()),
    );
    f.router.goto("shell@main/list@left", None, None).await.unwrap();

    let left = f.router.get_viewport("left").unwrap();
    f.router.follow_link("detail(2)@left", Some(&left)).await.unwrap();
    assert_eq!(f.shown("left").as_deref(), Some("detail(2)"));
    assert_eq!(f.shown("main").as_deref(), Some("shell"));

    f.router.follow_link("#/home@main", Some(&left)).await.unwrap();
    assert_eq!(f.shown("main").as_deref(), Some("home"));
}

#[tokio::test]
async fn test_query_is_kept_on_the_entry() {
    let f = fixture(config(vec![viewport("main")]), Components::new().plain(&["a"]));

    f.router.goto("a@main?x=1&flag", None, None).await.unwrap();

    let entry = f.router.navigator().current_entry().unwrap();
    assert_eq!(entry.parameters.get("x").map(String::as_str), Some("1"));
    assert_eq!(entry.parameter_list, vec!["flag"]);
    assert_eq!(entry.path.as_deref(), Some("a@main?x=1&flag"));
    assert_eq!(entry.full_state_instruction.as_deref(), Some("a@main?x=1&flag"));
}

#[tokio::test]
async fn test_instruction_lists_are_routed() {
    let f = fixture(config(vec![viewport("main")]), Components::new().plain(&["a"]));

    f.router
        .goto(ViewportInstruction::new("a").with_parameters("1,2").in_viewport("main"), None, None)
        .await
        .unwrap();

    assert_eq!(f.shown("main").as_deref(), Some("a(1,2)"));
    assert_eq!(f.recorder.count("a:canEnter[\"1\", \"2\"]"), 1);
}

#[tokio::test]
async fn test_navs_track_active_components() {
    let f = fixture(
        config(vec![scoped("main")]),
        Components::new().plain(&["list", "about"]).hosting("shell", &panes()),
    );
    let list = NavRoute::new("List", "shell@main/list@left");
    let about = NavRoute::new("About", "about@main");
    f.router.set_nav("top", vec![list.clone()]);
    f.router.add_nav("top", vec![about.clone()]);

    f.router.goto("shell@main/list@left", None, None).await.unwrap();

    let nav = f.router.find_nav("top").unwrap();
    assert_eq!(nav.routes.len(), 2);
    assert!(f.router.is_route_active(&list));
    assert!(!f.router.is_route_active(&about));
    assert_eq!(f.router.active_components(), vec!["shell", "list"]);
}

struct Aliases;

impl RouteTransformer for Aliases {
    fn transform_from_url(&self, path: &str) -> Transformed {
        match path {
            "home" => Transformed::Instructions(vec![ViewportInstruction::new("start").in_viewport("main")]),
            other => Transformed::Path(other.to_string()),
        }
    }

    fn transform_to_url(&self, instructions: Vec<ViewportInstruction>) -> Transformed {
        if instructions.iter().any(|vi| vi.component_name.as_deref() == Some("start")) {
            Transformed::Path("home".into())
        } else {
            Transformed::Instructions(instructions)
        }
    }
}

#[tokio::test]
async fn test_transformer_rewrites_both_ways() {
    let f = fixture_with(
        config(vec![viewport("main")]),
        Components::new().plain(&["start", "b"]),
        RouterOptions {
            transformer: Some(Arc::new(Aliases)),
            ..Default::default()
        },
    );

    f.router.goto("home", None, None).await.unwrap();
    assert_eq!(f.shown("main").as_deref(), Some("start"));
    assert_eq!(f.path().as_deref(), Some("home"));
    let entry = f.router.navigator().current_entry().unwrap();
    assert_eq!(entry.full_state_instruction.as_deref(), Some("start@main"));

    f.router.goto("b@main", None, None).await.unwrap();
    f.router.back().await.unwrap();
    assert_eq!(f.shown("main").as_deref(), Some("start"));
}

#[tokio::test]
async fn test_report_callback_sees_every_round() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let f = fixture_with(
        config(vec![viewport("main")]),
        Components::new().plain(&["a", "b"]),
        RouterOptions {
            report_callback: Some(Arc::new(move |_: &NavigationInstruction| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        },
    );

    f.router.goto("a@main", None, None).await.unwrap();
    f.router.goto("b@main", None, None).await.unwrap();
    f.router.back().await.unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_added_viewport_instruction_starts_a_round() {
    let f = fixture(
        config(vec![viewport("main"), viewport("side")]),
        Components::new().plain(&["a", "b"]),
    );
    f.router.goto("a@main", None, None).await.unwrap();

    f.router
        .add_processing_viewport(ViewportInstruction::new("b").in_viewport("side"));

    eventually(|| f.path().as_deref() == Some("a@main+b@side")).await;
    assert_eq!(f.shown("side").as_deref(), Some("b"));
    assert_eq!(f.shown("main").as_deref(), Some("a"));
    assert_eq!(f.recorder.count("a:enter"), 1);
}

#[tokio::test]
async fn test_viewports_can_be_added_and_removed() {
    let f = fixture(config(vec![scoped("main")]), Components::new().plain(&["a", "b"]));
    let main = f.router.get_viewport("main").unwrap();

    let extra = f.router.add_viewport("extra", Some(&main), ViewportOptions::default());
    assert!(f.router.get_viewport("extra").is_some());
    assert_eq!(f.router.scopes().len(), 2);
    assert!(Arc::ptr_eq(&f.router.find_scope(Some(&main)), main.scope().unwrap()));

    f.router.goto("a@main/b@extra", None, None).await.unwrap();
    assert_eq!(f.shown("extra").as_deref(), Some("b"));

    f.router.remove_viewport(&extra);
    assert!(f.router.get_viewport("extra").is_none());
    assert_eq!(f.router.all_viewports().len(), 1);
}
