mod common;

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use casbin::MemoryAdapter;
use common::{MODEL_PATH, POLICY_PATH, fixture_builder, request_parts, roles};
use policy_gate::engine::ModelSource;
use policy_gate::gate::GateBuilder;
use policy_gate_core::{AuthorizationTarget, Decision, GateError};

#[tokio::test]
async fn test_no_policy_or_adapter_fails() {
    let result = GateBuilder::new(ModelSource::file(MODEL_PATH)).build().await;
    assert!(matches!(result, Err(GateError::Config(_))));
}

#[tokio::test]
async fn test_no_policy_source_fails_before_loading_model() {
    let result = GateBuilder::new(ModelSource::file("missing/model.conf"))
        .build()
        .await;
    assert!(matches!(result, Err(GateError::Config(_))));
}

#[tokio::test]
async fn test_empty_adapter_denies_default_role() {
    let gate = GateBuilder::new(ModelSource::file(MODEL_PATH))
        .adapter(MemoryAdapter::default())
        .build()
        .await
        .unwrap();

    let decision = gate.authorize(&request_parts("GET", "/", None)).await.unwrap();
    assert!(!decision.is_permit());
}

#[tokio::test]
async fn test_adapter_takes_precedence_over_policy_file() {
    let gate = fixture_builder()
        .adapter(MemoryAdapter::default())
        .build()
        .await
        .unwrap();

    let decision = gate
        .authorize(&request_parts("GET", "/", Some(&["any"])))
        .await
        .unwrap();
    assert!(!decision.is_permit());
}

#[tokio::test]
async fn test_in_memory_rules_source() {
    let gate = GateBuilder::new(ModelSource::file(MODEL_PATH))
        .rules(vec![roles(&["p", "any", "/", "GET"])])
        .build()
        .await
        .unwrap();

    let decision = gate.authorize(&request_parts("GET", "/", None)).await.unwrap();
    assert!(decision.is_permit());
}

#[tokio::test]
async fn test_model_from_text() {
    let model = std::fs::read_to_string(MODEL_PATH).unwrap();
    let gate = GateBuilder::new(ModelSource::text(model))
        .policy_file(POLICY_PATH)
        .build()
        .await
        .unwrap();

    let decision = gate
        .authorize(&request_parts("DELETE", "/users/1", Some(&["admin"])))
        .await
        .unwrap();
    assert!(decision.is_permit());
}

#[tokio::test]
async fn test_missing_model_file_is_engine_error() {
    let result = GateBuilder::new(ModelSource::file("missing/model.conf"))
        .policy_file(POLICY_PATH)
        .build()
        .await;
    assert!(matches!(result, Err(GateError::Engine(_))));
}

#[tokio::test]
async fn test_missing_policy_file_is_engine_error() {
    let result = GateBuilder::new(ModelSource::file(MODEL_PATH))
        .policy_file("missing/policy.csv")
        .build()
        .await;
    assert!(matches!(result, Err(GateError::Engine(_))));
}

#[tokio::test]
async fn test_success_callback_invoked_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let gate = fixture_builder()
        .on_success(move |role, object, action| {
            recorded
                .lock()
                .unwrap()
                .push(format!("{} {} {}", role, action, object));
        })
        .build()
        .await
        .unwrap();

    let decision = gate.authorize(&request_parts("GET", "/", None)).await.unwrap();

    assert!(decision.is_permit());
    assert_eq!(*calls.lock().unwrap(), vec!["any GET /".to_string()]);
}

#[tokio::test]
async fn test_failure_callback_invoked_once_with_all_roles() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let successes = Arc::new(AtomicUsize::new(0));
    let success_count = Arc::clone(&successes);
    let gate = fixture_builder()
        .on_success(move |_, _, _| {
            success_count.fetch_add(1, Ordering::SeqCst);
        })
        .on_failure(move |roles, object, action| {
            recorded
                .lock()
                .unwrap()
                .push((roles.to_vec(), object.to_string(), action.to_string()));
        })
        .build()
        .await
        .unwrap();

    let decision = gate
        .authorize(&request_parts("GET", "/unknown", Some(&["user", "any"])))
        .await
        .unwrap();

    assert!(!decision.is_permit());
    assert_eq!(successes.load(Ordering::SeqCst), 0);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![(
            roles(&["user", "any"]),
            "/unknown".to_string(),
            "GET".to_string()
        )]
    );
}

#[tokio::test]
async fn test_failover_to_default_role() {
    let gate = fixture_builder().build().await.unwrap();

    let decision = gate.authorize(&request_parts("GET", "/", None)).await.unwrap();
    assert_eq!(
        decision,
        Decision::Permit {
            role: "any".to_string()
        }
    );
}

#[tokio::test]
async fn test_custom_default_role() {
    let gate = fixture_builder().default_role("user").build().await.unwrap();

    let decision = gate
        .authorize(&request_parts("GET", "/users/1", None))
        .await
        .unwrap();
    assert_eq!(
        decision,
        Decision::Permit {
            role: "user".to_string()
        }
    );
}

#[tokio::test]
async fn test_failover_from_missing_header() {
    let gate = fixture_builder()
        .roles_from_header(true)
        .build()
        .await
        .unwrap();

    let decision = gate.authorize(&request_parts("GET", "/", None)).await.unwrap();
    assert!(decision.is_permit());
}

#[tokio::test]
async fn test_unknown_route_should_fail() {
    let gate = fixture_builder().build().await.unwrap();

    let decision = gate
        .authorize(&request_parts("PUT", "/unknown", Some(&["admin"])))
        .await
        .unwrap();
    assert_eq!(
        decision,
        Decision::Deny {
            roles: roles(&["admin"]),
            object: "/unknown".to_string(),
            action: "PUT".to_string(),
        }
    );
}

#[tokio::test]
async fn test_with_valid_role() {
    let gate = fixture_builder().build().await.unwrap();
    let cases = [
        ("/", "GET", "any"),
        ("/users", "POST", "any"),
        ("/", "GET", "user"),
        ("/users/1", "GET", "user"),
        ("/users/1", "PUT", "user"),
        ("/users/1", "DELETE", "admin"),
    ];

    for (object, action, role) in cases {
        let decision = gate
            .check(&AuthorizationTarget::new(object, action), roles(&[role]))
            .await
            .unwrap();
        assert!(
            decision.is_permit(),
            "{} should be allowed to {} {}",
            role,
            action,
            object
        );
    }
}

#[tokio::test]
async fn test_with_invalid_role() {
    let gate = fixture_builder().build().await.unwrap();
    let cases = [
        ("/users/1", "GET", "any"),
        ("/users/1", "PUT", "any"),
        ("/users/1", "DELETE", "user"),
    ];

    for (object, action, role) in cases {
        let decision = gate
            .check(&AuthorizationTarget::new(object, action), roles(&[role]))
            .await
            .unwrap();
        assert!(
            !decision.is_permit(),
            "{} should not be allowed to {} {}",
            role,
            action,
            object
        );
    }
}

#[tokio::test]
async fn test_any_authorized_role_grants_access() {
    let gate = fixture_builder().build().await.unwrap();

    let decision = gate
        .authorize(&request_parts("DELETE", "/users/1", Some(&["user", "admin"])))
        .await
        .unwrap();
    assert_eq!(
        decision,
        Decision::Permit {
            role: "admin".to_string()
        }
    );
}

#[tokio::test]
async fn test_gate_shared_across_tasks() {
    let gate = Arc::new(fixture_builder().build().await.unwrap());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                let role = if i % 2 == 0 { "admin" } else { "user" };
                gate.check(&AuthorizationTarget::new("/users/1", "DELETE"), vec![
                    role.to_string(),
                ])
                .await
                .unwrap()
                .is_permit()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i % 2 == 0);
    }
}
