#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{context_for, on, platform_server};
use jolokia_core::handler::{JolokiaContext, JolokiaRequest, RequestDispatcher, RequestType};
use jolokia_core::restrictor::{AccessRule, RuleRestrictor};
use serde_json::{json, Value};

fn execute(ctx: &JolokiaContext, request: Value) -> Value {
    RequestDispatcher::new().execute_json(ctx, &request)
}

fn value_of(response: &Value) -> &Value {
    assert_eq!(response["status"], 200, "unexpected failure: {}", response);
    &response["value"]
}

// ---------- read ----------

#[test]
fn test_read_single_attribute() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({"type": "read", "mbean": "java.lang:type=Memory", "attribute": "HeapMemoryUsage"}),
    );
    assert_eq!(
        value_of(&response),
        &json!({"init": 0, "used": 1024, "committed": 2048, "max": -1})
    );
    assert_eq!(response["request"]["attribute"], "HeapMemoryUsage");
}

#[test]
fn test_read_with_inner_path() {
    let ctx = context_for(platform_server());
    let response = RequestDispatcher::new()
        .execute_path(&ctx, "read/java.lang:type=Memory/HeapMemoryUsage/used");
    assert_eq!(value_of(&response), &json!(1024));
}

#[test]
fn test_read_unknown_inner_path() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({
            "type": "read",
            "mbean": "java.lang:type=Memory",
            "attribute": "HeapMemoryUsage",
            "path": "nope"
        }),
    );
    assert_eq!(response["status"], 404);
    assert_eq!(response["error_type"], "ERR_ATTRIBUTE_NOT_FOUND");
    assert!(response["error"].as_str().unwrap().contains("HeapMemoryUsage/nope"));
}

#[test]
fn test_read_all_attributes() {
    let ctx = context_for(platform_server());
    let response = execute(&ctx, json!({"type": "read", "mbean": "java.lang:type=Memory"}));
    let value = value_of(&response);
    assert_eq!(value.as_object().unwrap().len(), 2);
    assert_eq!(value["Verbose"], false);
}

#[test]
fn test_read_long_as_string() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({
            "type": "read",
            "mbean": "java.lang:type=Memory",
            "attribute": "HeapMemoryUsage",
            "path": "used",
            "config": {"serializeLong": "string"}
        }),
    );
    assert_eq!(value_of(&response), &json!("1024"));
}

#[test]
fn test_read_missing_attribute_in_list() {
    let ctx = context_for(platform_server());
    let request = json!({
        "type": "read",
        "mbean": "java.lang:type=Memory",
        "attribute": ["Verbose", "Missing"]
    });

    let strict = execute(&ctx, request.clone());
    assert_eq!(strict["status"], 404);

    let mut lenient_request = request;
    lenient_request["config"] = json!({"ignoreErrors": true});
    let lenient = execute(&ctx, lenient_request);
    assert_eq!(value_of(&lenient), &json!({"Verbose": false}));
}

#[test]
fn test_read_pattern() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({"type": "read", "mbean": "java.lang:type=MemoryPool,*", "attribute": "Name"}),
    );
    let value = value_of(&response).as_object().unwrap();
    assert_eq!(value.len(), 2);
    let mut names: Vec<&str> = value
        .values()
        .map(|attrs| attrs["Name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Eden Space", "Survivor Space"]);
}

#[test]
fn test_read_pattern_without_matches() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({"type": "read", "mbean": "java.lang:*", "attribute": "NoSuchThing"}),
    );
    assert_eq!(response["error_type"], "ERR_ATTRIBUTE_NOT_FOUND");
}

#[test]
fn test_read_denied_attribute() {
    let restrictor = RuleRestrictor::new().with_rule(AccessRule {
        mbean: on("java.lang:type=Memory"),
        deny_read: vec!["Heap*".into()],
        deny_write: vec![],
        deny_operations: vec![],
    });
    let ctx = context_for(platform_server()).with_restrictor(Arc::new(restrictor));

    let denied = execute(
        &ctx,
        json!({"type": "read", "mbean": "java.lang:type=Memory", "attribute": "HeapMemoryUsage"}),
    );
    assert_eq!(denied["status"], 403);

    let all = execute(&ctx, json!({"type": "read", "mbean": "java.lang:type=Memory"}));
    assert!(value_of(&all).get("HeapMemoryUsage").is_none());
}

#[test]
fn test_read_unknown_mbean() {
    let ctx = context_for(platform_server());
    let response = execute(&ctx, json!({"type": "read", "mbean": "test:type=Nothing"}));
    assert_eq!(response["status"], 404);
    assert_eq!(response["error_type"], "ERR_INSTANCE_NOT_FOUND");
}

// ---------- write ----------

#[test]
fn test_write_returns_old_value() {
    let ctx = context_for(platform_server());
    let dispatcher = RequestDispatcher::new();

    let response = dispatcher.execute_path(
        &ctx,
        "write/java.lang:name=Eden Space,type=MemoryPool/UsageThreshold/4096",
    );
    assert_eq!(value_of(&response), &json!(0));

    let read = execute(
        &ctx,
        json!({
            "type": "read",
            "mbean": "java.lang:type=MemoryPool,name=Eden Space",
            "attribute": "UsageThreshold"
        }),
    );
    assert_eq!(value_of(&read), &json!(4096));
}

#[test]
fn test_write_boolean_from_json() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({
            "type": "write",
            "mbean": "java.lang:type=Memory",
            "attribute": "Verbose",
            "value": true
        }),
    );
    assert_eq!(value_of(&response), &json!(false));
}

#[test]
fn test_write_rejections() {
    let ctx = context_for(platform_server());

    let read_only = execute(
        &ctx,
        json!({
            "type": "write",
            "mbean": "java.lang:type=MemoryPool,name=Eden Space",
            "attribute": "Name",
            "value": "Old Space"
        }),
    );
    assert_eq!(read_only["error_type"], "ERR_NOT_WRITABLE");

    let bad_value = execute(
        &ctx,
        json!({
            "type": "write",
            "mbean": "java.lang:type=MemoryPool,name=Eden Space",
            "attribute": "UsageThreshold",
            "value": "lots"
        }),
    );
    assert_eq!(bad_value["status"], 400);

    let pattern = execute(
        &ctx,
        json!({
            "type": "write",
            "mbean": "java.lang:type=MemoryPool,*",
            "attribute": "UsageThreshold",
            "value": 1
        }),
    );
    assert_eq!(pattern["status"], 400);

    let inner = execute(
        &ctx,
        json!({
            "type": "write",
            "mbean": "java.lang:type=Memory",
            "attribute": "Verbose",
            "value": true,
            "path": "x"
        }),
    );
    assert_eq!(inner["status"], 400);
}

// ---------- exec ----------

#[test]
fn test_exec_with_signature() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({
            "type": "exec",
            "mbean": "test:type=Calculator",
            "operation": "add(int,int)",
            "arguments": [2, 3]
        }),
    );
    assert_eq!(value_of(&response), &json!(5));
}

#[test]
fn test_exec_string_arguments_from_path() {
    let ctx = context_for(platform_server());
    let response =
        RequestDispatcher::new().execute_path(&ctx, "exec/test:type=Calculator/add(long,long)/40/2");
    assert_eq!(value_of(&response), &json!(42));
}

#[test]
fn test_exec_ambiguous_overload() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({
            "type": "exec",
            "mbean": "test:type=Calculator",
            "operation": "add",
            "arguments": [1, 1]
        }),
    );
    assert_eq!(response["error_type"], "ERR_AMBIGUOUS_OPERATION");
    let message = response["error"].as_str().unwrap();
    assert!(message.contains("add(int,int)"));
    assert!(message.contains("add(long,long)"));
}

#[test]
fn test_exec_unique_by_name() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({"type": "exec", "mbean": "test:type=Calculator", "operation": "reset"}),
    );
    assert_eq!(value_of(&response), &Value::Null);
}

#[test]
fn test_exec_unknown_operation() {
    let ctx = context_for(platform_server());
    let response = execute(
        &ctx,
        json!({"type": "exec", "mbean": "test:type=Calculator", "operation": "divide"}),
    );
    assert_eq!(response["error_type"], "ERR_OPERATION_NOT_FOUND");
}

#[test]
fn test_exec_denied_operation() {
    let restrictor = RuleRestrictor::new().with_rule(AccessRule {
        mbean: on("test:*"),
        deny_read: vec![],
        deny_write: vec![],
        deny_operations: vec!["*".into()],
    });
    let ctx = context_for(platform_server()).with_restrictor(Arc::new(restrictor));
    let response = execute(
        &ctx,
        json!({"type": "exec", "mbean": "test:type=Calculator", "operation": "reset"}),
    );
    assert_eq!(response["status"], 403);
}

// ---------- search ----------

#[test]
fn test_search_pattern() {
    let ctx = context_for(platform_server());
    let response = RequestDispatcher::new().execute_path(&ctx, "search/java.lang:type=MemoryPool,*");
    let mut names: Vec<String> = value_of(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "java.lang:name=Eden Space,type=MemoryPool",
            "java.lang:name=Survivor Space,type=MemoryPool"
        ]
    );
}

#[test]
fn test_search_skips_hidden() {
    let restrictor = RuleRestrictor::new().hide(on("test:type=Empty"));
    let ctx = context_for(platform_server()).with_restrictor(Arc::new(restrictor));
    let response = execute(&ctx, json!({"type": "search", "mbean": "test:*"}));
    assert_eq!(value_of(&response), &json!(["test:type=Calculator"]));
}

#[test]
fn test_search_without_match_is_empty() {
    let ctx = context_for(platform_server());
    let response = execute(&ctx, json!({"type": "search", "mbean": "nowhere:*"}));
    assert_eq!(value_of(&response), &json!([]));
}

// ---------- list & dispatch ----------

#[test]
fn test_list_through_get_path() {
    let ctx = context_for(platform_server());
    let response = RequestDispatcher::new().execute_path(&ctx, "list/java.lang/type=Memory/op");
    assert_eq!(value_of(&response)["gc"]["ret"], "void");
    assert_eq!(response["request"]["type"], "list");
}

#[test]
fn test_list_with_escaped_slash() {
    let server = platform_server();
    server
        .register(
            on("app:type=Servlet,path=/ui"),
            Arc::new(jolokia_core::server::SimpleMBean::new(
                jolokia_core::model::MBeanInfo::new("x.Servlet", "servlet"),
            )),
        )
        .unwrap();
    let ctx = context_for(server);
    let response = RequestDispatcher::new().execute_path(&ctx, "list/app/path=!/ui,type=Servlet/class");
    assert_eq!(value_of(&response), &json!("x.Servlet"));
}

#[test]
fn test_request_types_restricted() {
    let restrictor = RuleRestrictor::new().allow_types(vec![RequestType::List, RequestType::Search]);
    let ctx = context_for(platform_server()).with_restrictor(Arc::new(restrictor));

    let read = execute(&ctx, json!({"type": "read", "mbean": "java.lang:type=Memory"}));
    assert_eq!(read["status"], 403);

    let search = execute(&ctx, json!({"type": "search", "mbean": "*:*"}));
    assert_eq!(value_of(&search).as_array().unwrap().len(), 5);
}

#[test]
fn test_invalid_requests() {
    let ctx = context_for(platform_server());

    let unknown_type = execute(&ctx, json!({"type": "version"}));
    assert_eq!(unknown_type["status"], 400);

    let no_mbean = execute(&ctx, json!({"type": "read"}));
    assert_eq!(no_mbean["status"], 400);

    let bad_name = execute(&ctx, json!({"type": "read", "mbean": "no-colon"}));
    assert_eq!(bad_name["error_type"], "ERR_MALFORMED_OBJECT_NAME");
}

#[test]
fn test_chained_handlers_merge_list_results() {
    let ctx = context_for(platform_server());
    let dispatcher = RequestDispatcher::empty()
        .with_handler(Box::new(jolokia_core::handler::ListHandler))
        .with_handler(Box::new(jolokia_core::handler::ListHandler));
    let request = JolokiaRequest::list(common::segments(&["test"]));

    let value = dispatcher.dispatch(&ctx, &request).unwrap();

    assert_eq!(value.as_object().unwrap().len(), 2);
    assert!(value["type=Calculator"]["op"]["add"].is_array());
}
