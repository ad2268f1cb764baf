use jrpc_core::{
    BoxError,
    descriptor::MethodSignature,
    error::{CallError, FaultKind, ProxyError, RequestEncodeError, ResponseDecodeError},
    proxy::{ParameterStructure, Proxy, ProxyBuilder},
    transform::{Argument, RpcParam, ToWire},
    transport::Capability,
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use stub_transport::{StubFailure, StubMode, TransportStub};
use tokio::sync::{mpsc, oneshot};

const SUBTRACT_BY_NAME: &str = "subtractWithMinuend:subtrahend:completion:";
const SUBTRACT_BY_POSITION: &str = "subtract:::";

fn subtract_stub(mode: StubMode) -> Arc<TransportStub> {
    let stub = TransportStub::new(mode);
    stub.configure_method("subtract", |params| match params {
        Value::Array(values) => json!(values[0].as_i64().unwrap() - values[1].as_i64().unwrap()),
        params => json!(params["minuend"].as_i64().unwrap() - params["subtrahend"].as_i64().unwrap()),
    });
    stub
}

fn build(
    stub: &Arc<TransportStub>,
    structure: ParameterStructure,
    signatures: &[&str],
) -> Proxy {
    ProxyBuilder::new(stub.clone())
        .parameter_structure(structure)
        .build(
            "Calculator",
            signatures.iter().map(|s| MethodSignature::new(*s)).collect(),
        )
        .unwrap()
}

async fn call(proxy: &Proxy, signature: &str, arguments: Vec<Argument>) -> Result<Value, ProxyError> {
    let (tx, rx) = oneshot::channel();
    proxy
        .invoke(signature, arguments, move |outcome| {
            let _ = tx.send(outcome);
        })
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("completion was not called in time")
        .expect("completion was dropped")
}

#[tokio::test]
async fn test_by_name_request() {
    let stub = subtract_stub(StubMode::Object);
    let proxy = build(&stub, ParameterStructure::ByName, &[SUBTRACT_BY_NAME]);

    let result = call(
        &proxy,
        SUBTRACT_BY_NAME,
        vec![42_i64.into_argument(), 23_i64.into_argument()],
    )
    .await
    .unwrap();

    assert_eq!(result, json!(19));

    let request = stub.last_request().unwrap().request;
    assert_eq!(
        request,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "subtract",
            "params": {"minuend": 42, "subtrahend": 23}
        })
    );

    let keys: Vec<_> = request["params"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["minuend", "subtrahend"]);
}

#[tokio::test]
async fn test_by_position_request() {
    let stub = subtract_stub(StubMode::Object);
    let proxy = build(&stub, ParameterStructure::ByPosition, &[SUBTRACT_BY_POSITION]);

    let result = call(
        &proxy,
        SUBTRACT_BY_POSITION,
        vec![23_i64.into_argument(), 42_i64.into_argument()],
    )
    .await
    .unwrap();

    assert_eq!(result, json!(-19));
    assert_eq!(
        stub.last_request().unwrap().request,
        json!({"jsonrpc": "2.0", "id": 1, "method": "subtract", "params": [23, 42]})
    );
}

#[tokio::test]
async fn test_call_form_signature() {
    let stub = subtract_stub(StubMode::Data);
    let proxy = build(
        &stub,
        ParameterStructure::ByName,
        &["subtract(minuend:subtrahend:completion:)"],
    );

    let result = call(
        &proxy,
        "subtract(minuend:subtrahend:completion:)",
        vec![10_i64.into_argument(), 4_i64.into_argument()],
    )
    .await
    .unwrap();

    assert_eq!(result, json!(6));
}

#[tokio::test]
async fn test_server_error_is_delivered_as_fault() {
    let stub = TransportStub::new(StubMode::Object);
    let proxy = build(&stub, ParameterStructure::ByPosition, &["foobar:"]);

    let err = call(&proxy, "foobar:", vec![]).await.unwrap_err();

    assert_eq!(err.code(), ProxyError::SERVER_RESPONSE_CODE);
    let fault = err.fault().unwrap();
    assert_eq!(fault.code, -32601);
    assert_eq!(fault.message, "Method not found");
    assert_eq!(fault.kind(), FaultKind::MethodNotFound);
}

#[tokio::test]
async fn test_server_error_keeps_its_data() {
    let stub = TransportStub::new(StubMode::Data);
    stub.configure_error("withdraw", -32000, "Insufficient funds", Some(json!({"balance": 3})));
    let proxy = build(&stub, ParameterStructure::ByName, &["withdrawWithAmount:completion:"]);

    let err = call(&proxy, "withdrawWithAmount:completion:", vec![10_i64.into_argument()])
        .await
        .unwrap_err();

    let fault = err.fault().unwrap();
    assert_eq!(fault.kind(), FaultKind::Application(-32000));
    assert_eq!(fault.data, Some(json!({"balance": 3})));
}

#[tokio::test]
async fn test_object_and_data_capabilities_send_the_same_request() {
    let object = subtract_stub(StubMode::Object);
    let data = subtract_stub(StubMode::Data);

    let mut results = vec![];
    for stub in [&object, &data] {
        let proxy = build(stub, ParameterStructure::ByName, &[SUBTRACT_BY_NAME]);
        let arguments = vec![5_i64.into_argument(), 3_i64.into_argument()];
        results.push(call(&proxy, SUBTRACT_BY_NAME, arguments).await.unwrap());
    }

    assert_eq!(results[0], results[1]);

    let object_request = object.last_request().unwrap();
    let data_request = data.last_request().unwrap();
    assert_eq!(object_request.capability, Capability::Object);
    assert_eq!(data_request.capability, Capability::Data);
    assert_eq!(object_request.request, data_request.request);
}

#[tokio::test]
async fn test_object_capability_is_preferred() {
    let stub = subtract_stub(StubMode::Both);
    let proxy = build(&stub, ParameterStructure::ByPosition, &[SUBTRACT_BY_POSITION]);

    assert_eq!(proxy.transport_capability(), Capability::Object);

    for _ in 0..3 {
        call(
            &proxy,
            SUBTRACT_BY_POSITION,
            vec![1_i64.into_argument(), 1_i64.into_argument()],
        )
        .await
        .unwrap();
    }

    assert!(
        stub.requests()
            .iter()
            .all(|request| request.capability == Capability::Object)
    );
}

#[tokio::test]
async fn test_unmatched_response_is_dropped() {
    let stub = TransportStub::new(StubMode::Object);
    stub.configure_raw_response("ping", |request| {
        json!({"jsonrpc": "2.0", "id": request["id"].as_u64().unwrap() + 100, "result": "pong"})
    });
    stub.configure_method("echo", |params| params[0].clone());

    let (hook_tx, mut hook_rx) = mpsc::unbounded_channel();
    let proxy = ProxyBuilder::new(stub.clone())
        .parameter_structure(ParameterStructure::ByPosition)
        .on_unmatched_response(move |response| {
            let _ = hook_tx.send(response.clone());
        })
        .build(
            "Pinger",
            vec![MethodSignature::new("ping:"), MethodSignature::new("echo::")],
        )
        .unwrap();

    let (tx, mut rx) = oneshot::channel();
    proxy
        .invoke("ping:", vec![], move |outcome| {
            let _ = tx.send(outcome);
        })
        .unwrap();

    let unmatched = tokio::time::timeout(Duration::from_secs(5), hook_rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(unmatched["id"], json!(101));
    assert_eq!(proxy.pending_calls(), 1);
    assert!(rx.try_recv().is_err());

    // Later calls on the same proxy still resolve with their own response.
    let echoed = call(&proxy, "echo::", vec!["after".into_argument()])
        .await
        .unwrap();
    assert_eq!(echoed, json!("after"));
    assert_eq!(stub.last_request().unwrap().request["id"], json!(2));
    assert_eq!(proxy.pending_calls(), 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_response_without_id_is_dropped() {
    let stub = TransportStub::new(StubMode::Data);
    stub.configure_raw_response("ping", |_| {
        json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}})
    });

    let (hook_tx, mut hook_rx) = mpsc::unbounded_channel();
    let proxy = ProxyBuilder::new(stub.clone())
        .on_unmatched_response(move |response| {
            let _ = hook_tx.send(response.clone());
        })
        .build("Pinger", vec![MethodSignature::new("ping(completion:)")])
        .unwrap();

    proxy.invoke("ping(completion:)", vec![], |_| {}).unwrap();

    let unmatched = tokio::time::timeout(Duration::from_secs(5), hook_rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(unmatched["error"]["code"], json!(-32700));
    assert_eq!(proxy.pending_calls(), 1);
}

#[tokio::test]
async fn test_malformed_responses() {
    let stub = TransportStub::new(StubMode::Object);
    stub.configure_raw_response("oldVersion", |request| {
        json!({"jsonrpc": "1.0", "id": request["id"], "result": 1})
    });
    stub.configure_raw_response("both", |request| {
        json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "result": 1,
            "error": {"code": 1, "message": "also an error"}
        })
    });
    stub.configure_raw_response("neither", |request| {
        json!({"jsonrpc": "2.0", "id": request["id"]})
    });
    stub.configure_raw_response("badError", |request| {
        json!({"jsonrpc": "2.0", "id": request["id"], "error": {"code": "x", "message": "m"}})
    });

    let proxy = build(
        &stub,
        ParameterStructure::ByPosition,
        &["oldVersion:", "both:", "neither:", "badError:"],
    );

    let err = call(&proxy, "oldVersion:", vec![]).await.unwrap_err();
    assert_eq!(err.code(), ProxyError::RESPONSE_SERIALIZATION_CODE);
    assert!(matches!(
        err,
        ProxyError::ResponseSerialization(ResponseDecodeError::InvalidVersion(_))
    ));

    let err = call(&proxy, "both:", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::ResponseSerialization(ResponseDecodeError::AmbiguousOutcome)
    ));

    let err = call(&proxy, "neither:", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::ResponseSerialization(ResponseDecodeError::MissingOutcome)
    ));

    let err = call(&proxy, "badError:", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::ResponseSerialization(ResponseDecodeError::InvalidErrorObject(_))
    ));

    assert_eq!(proxy.pending_calls(), 0);
}

#[tokio::test]
async fn test_undecodable_payload_fails_the_call() {
    let stub = TransportStub::new(StubMode::Data);
    stub.configure_raw_bytes("status", "<html>502 Bad Gateway</html>");
    let proxy = build(&stub, ParameterStructure::ByName, &["status(completion:)"]);

    let err = call(&proxy, "status(completion:)", vec![]).await.unwrap_err();

    assert!(matches!(
        err,
        ProxyError::ResponseSerialization(ResponseDecodeError::InvalidJson(_))
    ));
    assert_eq!(proxy.pending_calls(), 0);
}

#[tokio::test]
async fn test_transport_failure() {
    let stub = TransportStub::new(StubMode::Object);
    stub.configure_failure("subtract", "connection reset by peer");
    let proxy = build(&stub, ParameterStructure::ByName, &[SUBTRACT_BY_NAME]);

    let err = call(
        &proxy,
        SUBTRACT_BY_NAME,
        vec![1_i64.into_argument(), 2_i64.into_argument()],
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), ProxyError::TRANSPORT_CODE);
    assert!(err.to_string().contains("connection reset by peer"));
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(
        source.downcast_ref::<StubFailure>().map(ToString::to_string),
        Some("connection reset by peer".to_string())
    );
    assert_eq!(proxy.pending_calls(), 0);
}

struct Unrepresentable;

impl ToWire for Unrepresentable {
    fn to_wire(&self) -> Result<Value, BoxError> {
        Err("no JSON representation".into())
    }
}

#[tokio::test]
async fn test_argument_that_cannot_be_transformed() {
    let stub = subtract_stub(StubMode::Object);
    let proxy = build(&stub, ParameterStructure::ByName, &[SUBTRACT_BY_NAME]);

    let err = call(
        &proxy,
        SUBTRACT_BY_NAME,
        vec![1_i64.into_argument(), Argument::transform(Unrepresentable)],
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), ProxyError::REQUEST_SERIALIZATION_CODE);
    assert!(matches!(
        err,
        ProxyError::RequestSerialization(RequestEncodeError::Argument { index: 1, .. })
    ));
    assert!(stub.requests().is_empty());
    assert_eq!(proxy.pending_calls(), 0);
}

#[tokio::test]
async fn test_unknown_method_and_wrong_arity_are_rejected() {
    let stub = subtract_stub(StubMode::Object);
    let proxy = build(&stub, ParameterStructure::ByName, &[SUBTRACT_BY_NAME]);

    let err = proxy
        .invoke("divideWithDividend:divisor:completion:", vec![], |_| {
            panic!("completion must not run")
        })
        .unwrap_err();
    assert!(matches!(err, CallError::UnknownMethod(_)));

    let err = proxy
        .invoke(SUBTRACT_BY_NAME, vec![1_i64.into_argument()], |_| {
            panic!("completion must not run")
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CallError::ArgumentCount {
            expected: 2,
            actual: 1,
            ..
        }
    ));

    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_silent_server_leaves_the_call_pending() {
    let stub = TransportStub::new(StubMode::Object);
    stub.configure_silence("wait");
    let proxy = build(&stub, ParameterStructure::ByPosition, &["wait:"]);

    let (tx, rx) = oneshot::channel::<Result<Value, ProxyError>>();
    proxy
        .invoke("wait:", vec![], move |outcome| {
            let _ = tx.send(outcome);
        })
        .unwrap();

    assert!(
        tokio::time::timeout(Duration::from_millis(50), rx)
            .await
            .is_err()
    );
    assert_eq!(proxy.pending_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_resolve_to_their_own_completion() {
    let stub = TransportStub::new(StubMode::Data);
    stub.configure_method("echo", |params| params[0].clone());
    let proxy = build(&stub, ParameterStructure::ByPosition, &["echo::"]);

    let calls = (0..50_i64).map(|n| {
        let proxy = proxy.clone();
        async move { (n, call(&proxy, "echo::", vec![n.into_argument()]).await) }
    });

    for (n, result) in futures_util::future::join_all(calls).await {
        assert_eq!(result.unwrap(), json!(n));
    }

    let mut ids: Vec<_> = stub
        .requests()
        .iter()
        .map(|request| request.request["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    assert_eq!(proxy.pending_calls(), 0);
}

#[tokio::test]
async fn test_completion_runs_inside_the_runtime() {
    let stub = subtract_stub(StubMode::Object);
    let proxy = build(&stub, ParameterStructure::ByName, &[SUBTRACT_BY_NAME]);

    let (tx, rx) = oneshot::channel();
    proxy
        .invoke(
            SUBTRACT_BY_NAME,
            vec![2_i64.into_argument(), 1_i64.into_argument()],
            move |_| {
                let _ = tx.send(tokio::runtime::Handle::try_current().is_ok());
            },
        )
        .unwrap();

    assert!(rx.await.unwrap());
}

#[test]
fn test_explicit_delivery_context() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let stub = subtract_stub(StubMode::Data);
    let proxy = ProxyBuilder::new(stub.clone())
        .delivery_context(runtime.handle().clone())
        .build("Calculator", vec![MethodSignature::new(SUBTRACT_BY_NAME)])
        .unwrap();

    let (tx, rx) = oneshot::channel();
    proxy
        .invoke(
            SUBTRACT_BY_NAME,
            vec![7_i64.into_argument(), 2_i64.into_argument()],
            move |outcome| {
                let _ = tx.send(outcome);
            },
        )
        .unwrap();

    assert_eq!(runtime.block_on(rx).unwrap().unwrap(), json!(5));
}
