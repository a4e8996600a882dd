//! Integration tests for the Sacco contract client.
//!
//! These tests use a mock server to simulate the chain node's JSON-RPC
//! responses.

use alloy_primitives::{Address, B256, U256};
use assert_matches::assert_matches;
use sacco_client::form::{DepositSavingsForm, FormPhase};
use sacco_client::{
    ClientConfig, ContractDescriptor, MonitorOutcome, SaccoClient, SaccoError, SaccoEventKind,
    Signer, TransactionRequest,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const CONTRACT: Address = Address::repeat_byte(0xcc);

/// Helper to create test config pointed at the mock server
fn create_test_config(rpc_url: String) -> ClientConfig {
    ClientConfig::custom(rpc_url, 5115)
        .unwrap()
        .with_request_timeout(Duration::from_secs(5))
        .with_max_retries(2)
        .with_retry_config(10, 50, 2.0)
        .with_tx_config(50, 5)
        .with_event_poll_interval(50)
}

fn create_client(server: &MockServer) -> SaccoClient {
    let config = create_test_config(server.uri());
    SaccoClient::new(config, ContractDescriptor::new(CONTRACT, 5115)).unwrap()
}

/// Signer test double producing a deterministic raw transaction
struct TestSigner;

#[async_trait::async_trait]
impl Signer for TestSigner {
    fn address(&self) -> Address {
        Address::repeat_byte(0xaa)
    }

    async fn sign_transaction(
        &self,
        request: &TransactionRequest,
    ) -> sacco_client::Result<String> {
        // Not a real signature; the mock node accepts anything
        Ok(format!("0xsigned{}", &request.data[2..10]))
    }
}

/// ABI-encode a sequence of 32-byte words as 0x-hex
fn words_hex(values: &[U256]) -> String {
    let mut out = String::from("0x");
    for value in values {
        out.push_str(&hex::encode(value.to_be_bytes::<32>()));
    }
    out
}

fn rpc_result(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": value
    }))
}

fn member_info_words(shares: u64, savings: u64, capacity: u64) -> String {
    words_hex(&[
        U256::from(shares),
        U256::from(savings),
        U256::from(1_700_000_000u64),
        U256::from(1),
        U256::ZERO,
        U256::from(capacity),
    ])
}

fn address_topic(address: Address) -> String {
    let mut topic = [0u8; 32];
    topic[12..].copy_from_slice(address.as_slice());
    format!("{}", B256::from(topic))
}

#[tokio::test]
async fn test_client_creation_and_validation() {
    let config = ClientConfig::testnet();
    assert!(SaccoClient::new(config, ContractDescriptor::new(CONTRACT, 5115)).is_ok());

    assert!(ClientConfig::custom("".to_string(), 5115).is_err());
}

#[tokio::test]
async fn test_member_info_read_and_cache() {
    let mock_server = MockServer::start().await;
    let member = Address::repeat_byte(0x11);

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_result(json!(member_info_words(10, 5_000, 2_500))))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    assert!(!client.cached_member_info(member).is_loaded());

    let info = client.member_info(member).await.unwrap();
    assert_eq!(info.shares, U256::from(10));
    assert_eq!(info.savings, U256::from(5_000));
    assert_eq!(info.guarantee_capacity, U256::from(2_500));
    assert!(info.is_active);

    // The read landed in the shared cache
    let cached = client.cached_member_info(member);
    assert_eq!(cached.value(), Some(&info));
}

#[tokio::test]
async fn test_event_invalidates_cache_then_refetch_sees_new_value() {
    let mock_server = MockServer::start().await;
    let member = Address::repeat_byte(0x11);

    // First read observes 10 shares, the refetch after invalidation 15
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_result(json!(member_info_words(10, 5_000, 2_500))))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_result(json!(member_info_words(15, 5_000, 2_500))))
        .mount(&mock_server)
        .await;

    // Head advances between the two poll passes
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(rpc_result(json!("0x10")))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(rpc_result(json!("0x11")))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getLogs"})))
        .respond_with(rpc_result(json!([{
            "address": format!("{}", CONTRACT),
            "topics": [
                format!("{}", SaccoEventKind::SharesPurchased.topic()),
                address_topic(member),
            ],
            "data": words_hex(&[U256::from(5), U256::from(5_000)]),
            "blockNumber": "0x11"
        }])))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let info = client.member_info(member).await.unwrap();
    assert_eq!(info.shares, U256::from(10));
    assert!(client.cached_member_info(member).is_loaded());

    let poller = client.poller();
    // First pass only establishes the baseline block
    assert_eq!(poller.poll_once().await.unwrap(), 0);
    // Second pass decodes the SharesPurchased log and invalidates the cache
    assert_eq!(poller.poll_once().await.unwrap(), 1);
    assert!(!client.cached_member_info(member).is_loaded());

    let refetched = client.member_info(member).await.unwrap();
    assert_eq!(refetched.shares, U256::from(15));
}

#[tokio::test]
async fn test_write_lifecycle_to_confirmed() {
    let mock_server = MockServer::start().await;
    let tx_hash = B256::repeat_byte(0x77);

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
        .respond_with(rpc_result(json!(format!("{}", tx_hash))))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!({
            "transactionHash": format!("{}", tx_hash),
            "blockNumber": "0x10",
            "status": "0x1"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_blockNumber"})))
        .respond_with(rpc_result(json!("0x12")))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    client.session().connect(Arc::new(TestSigner));

    let handle = client.deposit_savings(U256::from(1_000)).await.unwrap();
    assert_eq!(handle.hash(), tx_hash);

    match handle.wait().await.unwrap() {
        MonitorOutcome::Confirmed(receipt) => {
            assert_eq!(receipt.transaction_hash, tx_hash);
            assert_eq!(receipt.block_number, 0x10);
            assert!(receipt.succeeded);
        }
        other => panic!("expected confirmation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reverted_write_returns_form_to_editing() {
    let mock_server = MockServer::start().await;
    let tx_hash = B256::repeat_byte(0x78);

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
        .respond_with(rpc_result(json!(format!("{}", tx_hash))))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(json!({
            "transactionHash": format!("{}", tx_hash),
            "blockNumber": "0x10",
            "status": "0x0"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    client.session().connect(Arc::new(TestSigner));

    let mut form = DepositSavingsForm::new();
    form.amount = "0.25".to_string();
    form.submit(&client).await;

    // Failure returns to editing with the entered amount intact
    assert_eq!(form.phase, FormPhase::Editing);
    assert_eq!(form.error.as_deref(), Some("transaction reverted"));
    assert_eq!(form.amount, "0.25");
}

#[tokio::test]
async fn test_capacity_guard_blocks_before_submission() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(rpc_result(json!(member_info_words(10, 1_000, 100))))
        .mount(&mock_server)
        .await;
    // The guard must reject before anything is signed or sent
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
        .respond_with(rpc_result(json!("0x00")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    client.session().connect(Arc::new(TestSigner));

    // Prime the cached capacity for the signer's account
    client.member_info(Address::repeat_byte(0xaa)).await.unwrap();

    let result = client.provide_guarantee(1, U256::from(200)).await;
    match result {
        Err(SaccoError::ExceedsCapacity {
            requested,
            capacity,
        }) => {
            assert_eq!(requested, U256::from(200));
            assert_eq!(capacity, U256::from(100));
        }
        other => panic!("expected capacity rejection, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_invalid_form_field_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(rpc_result(json!("0x0")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    client.session().connect(Arc::new(TestSigner));

    let mut form = DepositSavingsForm::new();
    form.amount = "not a number".to_string();
    form.submit(&client).await;

    assert_eq!(form.phase, FormPhase::Editing);
    assert!(form.error.is_some());
    assert_eq!(form.amount, "not a number");
}

#[tokio::test]
async fn test_revert_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_call"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 3, "message": "execution reverted: not a member"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client.total_shares().await;
    match result {
        Err(SaccoError::RemoteRejection(message)) => {
            assert!(message.contains("not a member"));
        }
        other => panic!("expected remote rejection, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_transient_node_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(rpc_result(json!("0x42")))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_purchase_attaches_exact_share_cost() {
    use sacco_client::constants::SHARE_PRICE;
    use std::sync::Mutex;

    /// Signer double capturing the request it was asked to sign
    struct CapturingSigner(Mutex<Option<TransactionRequest>>);

    #[async_trait::async_trait]
    impl Signer for CapturingSigner {
        fn address(&self) -> Address {
            Address::repeat_byte(0xaa)
        }

        async fn sign_transaction(
            &self,
            request: &TransactionRequest,
        ) -> sacco_client::Result<String> {
            *self.0.lock().unwrap() = Some(request.clone());
            Ok("0xsigned".to_string())
        }
    }

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
        .respond_with(rpc_result(json!(format!("{}", B256::repeat_byte(0x01)))))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let signer = Arc::new(CapturingSigner(Mutex::new(None)));
    client.session().connect(signer.clone());

    client.purchase_shares(5).await.unwrap();

    let request = signer.0.lock().unwrap().clone().unwrap();
    assert_eq!(request.value, SHARE_PRICE * U256::from(5));
    assert_eq!(request.to, CONTRACT);
    assert_eq!(request.chain_id, 5115);
}

#[tokio::test]
async fn test_write_without_wallet_is_rejected_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(rpc_result(json!("0x0")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client.purchase_shares(5).await;
    assert_matches!(result, Err(SaccoError::NotConnected));
}
