use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use qlance_api::{ApiConfig, AppState, create_router};
use qubic_client::RetryPolicy;
use qubic_client::codec::OnChainJobStatus;
use serde_json::{Value, json};
use test_components::{
    DeterministicSigner, MockLedger, TEST_CLIENT_ADDRESS, TEST_CLIENT_SEED, TEST_START_TICK,
    TEST_WORKER_ADDRESS, TEST_WORKER_SEED,
};

struct TestContext {
    server: TestServer,
    ledger: Arc<MockLedger>,
    state: AppState,
}

impl TestContext {
    fn new() -> Self {
        Self::with_signer(DeterministicSigner::new())
    }

    fn with_signer(signer: DeterministicSigner) -> Self {
        let ledger = Arc::new(MockLedger::new(TEST_START_TICK));
        let config = ApiConfig {
            retry: RetryPolicy {
                max_retries: 2,
                delay: Duration::from_millis(1),
            },
            ..ApiConfig::default()
        };
        let signer = Arc::new(signer);
        let state = AppState::new(config, ledger.clone(), signer.clone(), signer);
        let server = TestServer::new(create_router(state.clone())).unwrap();

        Self {
            server,
            ledger,
            state,
        }
    }

    async fn create_job(&self) -> Value {
        let response = self
            .server
            .post("/api/jobs")
            .json(&json!({
                "title": "Design a logo",
                "description": "Vector logo for a DeFi dashboard",
                "priceInQubic": 1000,
                "clientAddress": TEST_CLIENT_ADDRESS,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}

#[tokio::test]
async fn test_root_and_info() {
    let ctx = TestContext::new();

    let root = ctx.server.get("/").await.json::<Value>();
    assert_eq!(root["endpoints"]["health"], "/health");

    let info = ctx.server.get("/api/info").await.json::<Value>();
    assert_eq!(info["environment"], "development");
    assert_eq!(info["blockchain"]["rpcUrl"], "http://mock-ledger.local/");
}

#[tokio::test]
async fn test_health_reports_rpc_reachability() {
    let ctx = TestContext::new();

    let body = ctx.server.get("/health").await.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["qubic"]["connected"], true);

    ctx.ledger.set_offline(true).await;
    let response = ctx.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["qubic"]["connected"], false);
}

#[tokio::test]
async fn test_create_list_and_get_job() {
    let ctx = TestContext::new();
    let job = ctx.create_job().await;

    assert_eq!(job["status"], "open");
    assert_eq!(job["category"], "general");
    assert_eq!(job["priceInQubic"], 1000);
    assert!(job.get("workerAddress").is_none());

    let list = ctx.server.get("/api/jobs").await.json::<Value>();
    assert_eq!(list["success"], true);
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    assert_eq!(list["message"], "Retrieved 1 open jobs");

    let id = job["id"].as_str().unwrap();
    let fetched = ctx.server.get(&format!("/api/jobs/{}", id)).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["data"], job);
}

#[tokio::test]
async fn test_create_job_accepts_string_price() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .post("/api/jobs")
        .json(&json!({
            "title": "Audit",
            "description": "Review a contract",
            "category": "security",
            "priceInQubic": "250000",
            "clientAddress": TEST_CLIENT_ADDRESS,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let job = &response.json::<Value>()["data"];
    assert_eq!(job["priceInQubic"], 250000);
    assert_eq!(job["category"], "security");
}

#[tokio::test]
async fn test_create_job_without_price_is_rejected() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .post("/api/jobs")
        .json(&json!({
            "title": "Design a logo",
            "description": "Vector logo",
            "clientAddress": TEST_CLIENT_ADDRESS,
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("priceInQubic"));
    assert!(ctx.state.registry.is_empty().await);
}

#[tokio::test]
async fn test_create_job_rejects_bad_input() {
    let ctx = TestContext::new();

    let bad_address = ctx
        .server
        .post("/api/jobs")
        .json(&json!({
            "title": "t",
            "description": "d",
            "priceInQubic": 10,
            "clientAddress": "not-an-address",
        }))
        .await;
    bad_address.assert_status(StatusCode::BAD_REQUEST);

    let overflow = ctx
        .server
        .post("/api/jobs")
        .json(&json!({
            "title": "t",
            "description": "d",
            "priceInQubic": "18446744073709551616",
            "clientAddress": TEST_CLIENT_ADDRESS,
        }))
        .await;
    overflow.assert_status(StatusCode::BAD_REQUEST);

    let malformed = ctx
        .server
        .post("/api/jobs")
        .content_type("application/json")
        .text("{not json")
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(malformed.json::<Value>()["success"], false);

    assert!(ctx.state.registry.is_empty().await);
}

#[tokio::test]
async fn test_get_unknown_job_is_404() {
    let ctx = TestContext::new();
    let response = ctx.server.get("/api/jobs/does-not-exist").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_second_claim_reports_current_status() {
    let ctx = TestContext::new();
    let job = ctx.create_job().await;
    let path = format!("/api/jobs/{}/claim", job["id"].as_str().unwrap());

    let first = ctx
        .server
        .put(&path)
        .json(&json!({ "workerAddress": TEST_WORKER_ADDRESS }))
        .await;
    first.assert_status_ok();
    let claimed = first.json::<Value>();
    assert_eq!(claimed["data"]["status"], "claimed");
    assert_eq!(claimed["data"]["workerAddress"], TEST_WORKER_ADDRESS);
    assert_eq!(claimed["message"], "Job claimed successfully");

    let second = ctx
        .server
        .put(&path)
        .json(&json!({ "workerAddress": TEST_CLIENT_ADDRESS }))
        .await;
    second.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        second.json::<Value>()["error"],
        "Job cannot be claimed. Current status: claimed"
    );

    let open = ctx.server.get("/api/jobs").await.json::<Value>();
    assert!(open["data"].as_array().unwrap().is_empty());

    let claimed_list = ctx
        .server
        .get("/api/jobs")
        .add_query_param("status", "claimed")
        .await
        .json::<Value>();
    assert_eq!(claimed_list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_claim_validation() {
    let ctx = TestContext::new();
    let job = ctx.create_job().await;
    let path = format!("/api/jobs/{}/claim", job["id"].as_str().unwrap());

    ctx.server
        .put(&path)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    ctx.server
        .put(&path)
        .json(&json!({ "workerAddress": "lowercase" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    ctx.server
        .put("/api/jobs/missing/claim")
        .json(&json!({ "workerAddress": TEST_WORKER_ADDRESS }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.server
        .get("/api/jobs")
        .add_query_param("status", "archived")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_on_chain_schedules_ahead_of_current_tick() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .post("/api/jobs/post-on-chain")
        .json(&json!({
            "seed": TEST_CLIENT_SEED,
            "walletAddress": TEST_CLIENT_ADDRESS,
            "priceInQubic": "1000",
        }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["message"], "Job posted to contract");
    assert_eq!(body["data"]["transactionId"], "tx-1");
    assert_eq!(body["data"]["currentTick"], TEST_START_TICK);
    assert_eq!(body["data"]["targetTick"], TEST_START_TICK + 10);

    assert_eq!(ctx.ledger.broadcasts().await.len(), 1);
    assert!(ctx.state.registry.is_empty().await);
}

#[tokio::test]
async fn test_worker_procedures_broadcast() {
    let ctx = TestContext::new();
    let body = json!({ "seed": TEST_WORKER_SEED, "walletAddress": TEST_WORKER_ADDRESS });

    for (suffix, message) in [
        ("claim-on-chain", "Job claimed on contract"),
        ("submit-work-on-chain", "Work submitted on contract"),
        ("approve-work-on-chain", "Work approved on contract"),
        ("reject-work-on-chain", "Work rejected on contract"),
    ] {
        let response = ctx
            .server
            .post(&format!("/api/jobs/7/{}", suffix))
            .json(&body)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["message"], message);
    }

    assert_eq!(ctx.ledger.broadcasts().await.len(), 4);
}

#[tokio::test]
async fn test_on_chain_input_errors_never_broadcast() {
    let ctx = TestContext::new();

    let missing = ctx
        .server
        .post("/api/jobs/1/claim-on-chain")
        .json(&json!({ "seed": TEST_WORKER_SEED }))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        missing.json::<Value>()["error"],
        "Missing required fields: seed, walletAddress"
    );

    ctx.server
        .post("/api/jobs/post-on-chain")
        .json(&json!({
            "seed": "TooShort",
            "walletAddress": TEST_CLIENT_ADDRESS,
            "priceInQubic": 5,
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/jobs/abc/claim-on-chain")
        .json(&json!({ "seed": TEST_WORKER_SEED, "walletAddress": TEST_WORKER_ADDRESS }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/jobs/18446744073709551616/claim-on-chain")
        .json(&json!({ "seed": TEST_WORKER_SEED, "walletAddress": TEST_WORKER_ADDRESS }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/jobs/1/claim-on-chain")
        .json(&json!({ "seed": TEST_WORKER_SEED, "walletAddress": "short" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(ctx.ledger.broadcasts().await.is_empty());
}

#[tokio::test]
async fn test_on_chain_infrastructure_failures() {
    let ctx = TestContext::new();
    let body = json!({ "seed": TEST_WORKER_SEED, "walletAddress": TEST_WORKER_ADDRESS });

    ctx.ledger.set_reject_broadcasts(true).await;
    let rejected = ctx
        .server
        .post("/api/jobs/3/submit-work-on-chain")
        .json(&body)
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    assert!(
        rejected.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .contains("invalid transaction")
    );
    assert_eq!(ctx.ledger.broadcasts().await.len(), 1);

    ctx.ledger.set_offline(true).await;
    let offline = ctx
        .server
        .post("/api/jobs/3/submit-work-on-chain")
        .json(&body)
        .await;
    offline.assert_status(StatusCode::BAD_GATEWAY);
    let error = offline.json::<Value>()["error"].clone();
    assert_eq!(error, "Ledger RPC unavailable");
    assert!(!error.as_str().unwrap().contains("mock ledger"));
}

#[tokio::test]
async fn test_signing_failure_is_bad_request() {
    let ctx = TestContext::with_signer(DeterministicSigner::failing());
    ctx.server
        .post("/api/jobs/1/approve-work-on-chain")
        .json(&json!({ "seed": TEST_CLIENT_SEED, "walletAddress": TEST_CLIENT_ADDRESS }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.ledger.broadcasts().await.is_empty());
}

#[tokio::test]
async fn test_contract_reads() {
    let ctx = TestContext::new();
    let first = ctx.ledger.add_job(1000, OnChainJobStatus::Open).await;
    let second = ctx.ledger.add_job(5000, OnChainJobStatus::Submitted).await;
    assert_eq!((first, second), (0, 1));

    let count = ctx.server.get("/api/contract/jobs-count").await;
    count.assert_status_ok();
    assert_eq!(count.json::<Value>()["data"]["jobsCount"], 2);

    let job = ctx
        .server
        .get(&format!("/api/contract/jobs/{}", second))
        .await
        .json::<Value>();
    assert_eq!(job["data"]["jobId"], second);
    assert_eq!(job["data"]["price"], "5000");
    assert_eq!(job["data"]["status"], "submitted");
    assert_eq!(job["data"]["exists"], true);

    let missing = ctx
        .server
        .get("/api/contract/jobs/999")
        .await
        .json::<Value>();
    assert_eq!(missing["data"]["jobId"], 0);
    assert_eq!(missing["data"]["price"], "0");
    assert_eq!(missing["data"]["exists"], false);
}

#[tokio::test]
async fn test_first_contract_job_has_id_zero_and_exists() {
    let ctx = TestContext::new();
    ctx.ledger.add_job(1000, OnChainJobStatus::Open).await;

    let response = ctx.server.get("/api/contract/jobs/0").await;
    response.assert_status_ok();
    let job = response.json::<Value>();
    assert_eq!(job["data"]["jobId"], 0);
    assert_eq!(job["data"]["price"], "1000");
    assert_eq!(job["data"]["status"], "open");
    assert_eq!(job["data"]["exists"], true);

    let past_end = ctx.server.get("/api/contract/jobs/1").await.json::<Value>();
    assert_eq!(past_end["data"]["jobId"], 0);
    assert_eq!(past_end["data"]["exists"], false);
}

#[tokio::test]
async fn test_transaction_status_lookup() {
    let ctx = TestContext::new();
    ctx.server
        .post("/api/jobs/post-on-chain")
        .json(&json!({
            "seed": TEST_CLIENT_SEED,
            "walletAddress": TEST_CLIENT_ADDRESS,
            "priceInQubic": 1000,
        }))
        .await
        .assert_status_ok();

    let found = ctx.server.get("/api/transactions/tx-1").await;
    found.assert_status_ok();
    assert_eq!(found.json::<Value>()["data"]["transactionId"], "tx-1");

    ctx.server
        .get("/api/transactions/tx-99")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wallet_import_derives_identity_and_balance() {
    let ctx = TestContext::new();
    ctx.ledger.set_balance(TEST_CLIENT_ADDRESS, 123_456).await;

    let response = ctx
        .server
        .post("/api/wallet/import")
        .json(&json!({ "seed": TEST_CLIENT_SEED }))
        .await;
    response.assert_status_ok();
    let data = &response.json::<Value>()["data"];
    assert_eq!(data["publicKey"], TEST_CLIENT_ADDRESS);
    assert_eq!(data["balance"], "123456");
}

#[tokio::test]
async fn test_wallet_import_survives_balance_failure() {
    let ctx = TestContext::new();
    ctx.ledger
        .set_balance_body(TEST_CLIENT_ADDRESS, json!({ "balance": { "balance": "lots" } }))
        .await;

    let response = ctx
        .server
        .post("/api/wallet/import")
        .json(&json!({ "seed": TEST_CLIENT_SEED }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["balance"], "0");
}

#[tokio::test]
async fn test_wallet_import_validation() {
    let ctx = TestContext::new();

    let missing = ctx.server.post("/api/wallet/import").json(&json!({})).await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "Seed phrase is required");

    ctx.server
        .post("/api/wallet/import")
        .json(&json!({ "seed": "UPPERCASE" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wallet_balance() {
    let ctx = TestContext::new();
    ctx.ledger.set_balance(TEST_WORKER_ADDRESS, 42).await;

    let response = ctx
        .server
        .get(&format!("/api/wallet/{}/balance", TEST_WORKER_ADDRESS))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["balance"], "42");

    ctx.server
        .get("/api/wallet/short/balance")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.ledger
        .set_balance_body(TEST_CLIENT_ADDRESS, json!({ "unexpected": true }))
        .await;
    let unknown_shape = ctx
        .server
        .get(&format!("/api/wallet/{}/balance", TEST_CLIENT_ADDRESS))
        .await;
    unknown_shape.assert_status_ok();
    assert_eq!(unknown_shape.json::<Value>()["data"]["balance"], "0");
}

#[tokio::test]
async fn test_validate_address() {
    let ctx = TestContext::new();

    let valid = ctx
        .server
        .get(&format!("/api/wallet/validate/{}", TEST_CLIENT_ADDRESS))
        .await
        .json::<Value>();
    assert_eq!(valid["data"]["isValid"], true);

    let invalid = ctx
        .server
        .get(&format!("/api/wallet/validate/{}", &TEST_CLIENT_ADDRESS[..59]))
        .await
        .json::<Value>();
    assert_eq!(invalid["data"]["isValid"], false);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::new();
    let response = ctx.server.get("/api/nothing-here").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "error": "Route not found", "path": "/api/nothing-here" })
    );
}
