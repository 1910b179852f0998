//! Pipeline runs against a stub RPC, from raw key to report.

use std::time::Duration;

use devnet_transfer::blockchain::{ErrorCategory, SubmissionResult};
use devnet_transfer::lifecycle::ShutdownSignal;
use devnet_transfer::report;
use devnet_transfer::TransferPipeline;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use tokio::time::Instant;

mod common;

use common::{SendBehavior, StatusBehavior, StubRpc};

fn render(report: &devnet_transfer::TransferReport) -> (String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    report::render(report, &mut out, &mut err).unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_successful_self_transfer() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let keypair = Keypair::new();
    let key = common::key_json(&keypair);
    let pipeline = TransferPipeline::new(common::test_config(), stub.clone());

    let report = pipeline.run(Some(&key), &ShutdownSignal::never()).await;

    let signature = match &report.result {
        SubmissionResult::Success { signature } => *signature,
        other => panic!("expected success, got {:?}", other),
    };
    assert_eq!(stub.sent.lock().unwrap().as_slice(), &[signature]);
    assert_eq!(report.payer, Some(keypair.pubkey()));
    let request = report.request.unwrap();
    assert_eq!(request.to, keypair.pubkey());
    assert_eq!(request.lamports, 1_000_000);
    assert!(report.explorer_url.as_deref().unwrap().contains(&signature.to_string()));
    assert_eq!(report.exit_code(), 0);

    let (out, err) = render(&report);
    assert!(out.contains(&signature.to_string()));
    assert!(err.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_transfer_to_configured_recipient() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let recipient = Pubkey::new_unique();
    let mut config = common::test_config();
    config.transfer.recipient = recipient.to_string();
    config.transfer.lamports = 42;

    let key = common::key_json(&Keypair::new());
    let report = TransferPipeline::new(config, stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    assert!(report.result.is_success());
    let request = report.request.unwrap();
    assert_eq!(request.to, recipient);
    assert_eq!(request.lamports, 42);
}

#[tokio::test(start_paused = true)]
async fn test_unfunded_account_reports_funds_error() {
    let stub = StubRpc::new(
        SendBehavior::Reject(
            "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit."
                .to_string(),
        ),
        StatusBehavior::ConfirmImmediately,
    );
    let key = common::key_json(&Keypair::new());
    let report = TransferPipeline::new(common::test_config(), stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    match &report.result {
        SubmissionResult::Failure(classified) => {
            assert_eq!(classified.category, ErrorCategory::FundsError);
            assert!(classified.hint.as_deref().unwrap().contains("faucet"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(stub.sends(), 1);
    assert_eq!(report.exit_code(), 4);

    let (out, err) = render(&report);
    assert!(out.is_empty());
    assert!(err.contains("[FundsError]"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_key_makes_no_network_calls() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let report = TransferPipeline::new(common::test_config(), stub.clone())
        .run(None, &ShutdownSignal::never())
        .await;

    match &report.result {
        SubmissionResult::Failure(classified) => {
            assert_eq!(classified.category, ErrorCategory::ConfigError);
            assert!(classified.message.contains("PRIVATE_KEY"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(report.payer, None);
    assert_eq!(stub.total_calls(), 0);
    assert_eq!(report.exit_code(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_key_makes_no_network_calls() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let pipeline = TransferPipeline::new(common::test_config(), stub.clone());

    let out_of_range = format!("[{}]", vec!["300"; 64].join(","));

    for raw in ["not json", "[1, 2, 3]", out_of_range.as_str()] {
        let report = pipeline.run(Some(raw), &ShutdownSignal::never()).await;
        match &report.result {
            SubmissionResult::Failure(classified) => {
                assert_eq!(classified.category, ErrorCategory::ConfigError, "{}", raw);
                assert!(!classified.message.contains("300,300"), "key material echoed");
            }
            other => panic!("expected failure for {}, got {:?}", raw, other),
        }
    }
    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_amount_rejected_before_network() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let mut config = common::test_config();
    config.transfer.lamports = 0;

    let key = common::key_json(&Keypair::new());
    let report = TransferPipeline::new(config, stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    match &report.result {
        SubmissionResult::Failure(classified) => {
            assert_eq!(classified.category, ErrorCategory::ValidationError)
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(stub.total_calls(), 0);
    assert_eq!(report.exit_code(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_recipient_rejected_before_network() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let mut config = common::test_config();
    config.transfer.recipient = "not-a-pubkey".to_string();

    let key = common::key_json(&Keypair::new());
    let report = TransferPipeline::new(config, stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    match &report.result {
        SubmissionResult::Failure(classified) => {
            assert_eq!(classified.category, ErrorCategory::ValidationError);
            assert!(classified.message.contains("not-a-pubkey"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(stub.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_rpc_reports_network_error() {
    let stub = StubRpc::without_blockhash();
    let key = common::key_json(&Keypair::new());

    let start = Instant::now();
    let report = TransferPipeline::new(common::test_config(), stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    match &report.result {
        SubmissionResult::Failure(classified) => {
            assert_eq!(classified.category, ErrorCategory::NetworkError)
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(stub.blockhash_calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(stub.sends(), 0);
    assert_eq!(start.elapsed(), Duration::from_millis(1500));
    assert_eq!(report.exit_code(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_transfer_reports_timeout() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::NeverConfirm);
    let key = common::key_json(&Keypair::new());

    let report = TransferPipeline::new(common::test_config(), stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    match &report.result {
        SubmissionResult::Failure(classified) => {
            assert_eq!(classified.category, ErrorCategory::TimeoutError);
            assert!(classified.hint.as_deref().unwrap().contains("solscan.io/tx/"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(stub.sends(), 1);
    assert_eq!(report.exit_code(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_key_read_from_configured_variable() {
    let stub = StubRpc::new(SendBehavior::Accept, StatusBehavior::ConfirmImmediately);
    let keypair = Keypair::new();
    let mut config = common::test_config();
    config.key_env_var = "DEVNET_TRANSFER_E2E_KEY".to_string();
    let pipeline = TransferPipeline::new(config, stub.clone());

    let unset = pipeline.run_from_env(&ShutdownSignal::never()).await;
    assert_eq!(unset.exit_code(), 2);
    assert_eq!(stub.total_calls(), 0);

    std::env::set_var("DEVNET_TRANSFER_E2E_KEY", common::key_json(&keypair));
    let report = pipeline.run_from_env(&ShutdownSignal::never()).await;
    std::env::remove_var("DEVNET_TRANSFER_E2E_KEY");

    assert!(report.result.is_success(), "{:?}", report.result);
    assert_eq!(report.payer, Some(keypair.pubkey()));
}

#[tokio::test(start_paused = true)]
async fn test_partially_funded_payer_reports_funds_error() {
    let stub = StubRpc::new(
        SendBehavior::Accept,
        StatusBehavior::FailOnChain(
            "Error processing Instruction 0: custom program error: 0x1".to_string(),
        ),
    );
    let key = common::key_json(&Keypair::new());
    let report = TransferPipeline::new(common::test_config(), stub.clone())
        .run(Some(&key), &ShutdownSignal::never())
        .await;

    assert_eq!(report.exit_code(), 4);
    let (_, err) = render(&report);
    assert!(err.contains("Tip: Get free devnet SOL"));
}
