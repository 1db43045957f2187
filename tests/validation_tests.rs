//! Request validator: structural checks on the inbound envelope.

use n8n_mcp_server::error::INVALID_REQUEST;
use n8n_mcp_server::protocol::{read_id, validate_request, RpcId};
use serde_json::{json, Value};

fn rejects(raw: Value) {
    let err = validate_request(&raw).expect_err(&format!("expected rejection of {raw}"));
    assert_eq!(err.code(), INVALID_REQUEST, "wrong code for {raw}");
}

#[test]
fn accepts_a_well_formed_envelope() {
    let req = validate_request(&json!({
        "jsonrpc": "2.0",
        "id": "123",
        "method": "n8n_list_workflows",
        "params": { "filter": "test" }
    }))
    .unwrap();

    assert_eq!(req.id, Some(RpcId::from("123")));
    assert_eq!(req.method, "n8n_list_workflows");
    assert_eq!(req.params.get("filter"), Some(&json!("test")));
}

#[test]
fn missing_params_become_an_empty_object() {
    let req = validate_request(&json!({ "id": 1, "method": "x" })).unwrap();
    assert!(req.params.is_empty());
    assert_eq!(req.jsonrpc, None);
}

#[test]
fn non_object_envelopes_are_rejected() {
    rejects(Value::Null);
    rejects(json!("request"));
    rejects(json!(42));
    rejects(json!([{ "id": "1", "method": "x" }]));
}

#[test]
fn id_and_method_are_required() {
    rejects(json!({ "method": "x" }));
    rejects(json!({ "id": "1" }));
    rejects(json!({ "id": "1", "method": 123 }));
    rejects(json!({ "id": "1", "method": "" }));
}

#[test]
fn params_must_be_an_object_when_present() {
    rejects(json!({ "id": "1", "method": "x", "params": "x" }));
    rejects(json!({ "id": "1", "method": "x", "params": [1, 2] }));
    rejects(json!({ "id": "1", "method": "x", "params": 7 }));
    rejects(json!({ "id": "1", "method": "x", "params": null }));
}

#[test]
fn zero_empty_and_null_ids_are_legitimate() {
    let zero = validate_request(&json!({ "id": 0, "method": "x" })).unwrap();
    assert_eq!(zero.id, Some(RpcId::from(0)));

    let empty = validate_request(&json!({ "id": "", "method": "x" })).unwrap();
    assert_eq!(empty.id, Some(RpcId::from("")));

    let null = validate_request(&json!({ "id": null, "method": "x" })).unwrap();
    assert_eq!(null.id, None);
}

#[test]
fn structured_ids_are_rejected() {
    rejects(json!({ "id": true, "method": "x" }));
    rejects(json!({ "id": { "n": 1 }, "method": "x" }));
    rejects(json!({ "id": [1], "method": "x" }));
}

#[test]
fn wrong_protocol_version_is_rejected() {
    rejects(json!({ "jsonrpc": "1.0", "id": 1, "method": "x" }));
    rejects(json!({ "jsonrpc": 2, "id": 1, "method": "x" }));
}

#[test]
fn read_id_recovers_ids_from_invalid_envelopes() {
    assert_eq!(read_id(&json!({ "id": "abc", "method": 5 })), Some(RpcId::from("abc")));
    assert_eq!(read_id(&json!({ "id": 9 })), Some(RpcId::from(9)));
    assert_eq!(read_id(&json!({ "id": [1] })), None);
    assert_eq!(read_id(&json!("not an object")), None);
}
