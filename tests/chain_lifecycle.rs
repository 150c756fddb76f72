//! Integration tests for mining, validation and balances

use workchain::blockchain::{validate_chain, Violation, WorkChain};
use workchain::certificate::CertificateIssuer;
use workchain::config::ChainConfig;
use workchain::error::ChainError;
use workchain::transaction::Transaction;

fn config(difficulty: usize, min_certs: usize) -> ChainConfig {
    ChainConfig {
        difficulty,
        min_task_certificates_per_block: min_certs,
        mining_reward: 5,
        rollback_reward_on_shortfall: false,
    }
}

fn submit_certificates(chain: &WorkChain, range: std::ops::Range<usize>) {
    let issuer = CertificateIssuer::new();
    for i in range {
        if let Some(cert) = issuer.issue(&format!("task_{}", i), "Alice", true) {
            chain.submit_certificate(cert);
        }
    }
}

/// Chain with two mined blocks: A->B:50 in the first, B->C:30 in the second.
fn two_block_chain() -> Result<WorkChain, Box<dyn std::error::Error>> {
    let chain = WorkChain::new(config(2, 2))?;

    submit_certificates(&chain, 0..2);
    chain.submit_transaction("A", "B", 50);
    chain.mine("miner1")?;

    submit_certificates(&chain, 2..4);
    chain.submit_transaction("B", "C", 30);
    chain.mine("miner2")?;

    Ok(chain)
}

#[test]
fn test_genesis_alone_is_valid() -> Result<(), Box<dyn std::error::Error>> {
    let chain = WorkChain::new(config(1, 5))?;
    assert!(chain.validate());
    assert_eq!(chain.latest_block().previous_hash, "0");
    Ok(())
}

#[test]
fn test_fresh_chain_validates() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    assert_eq!(chain.block_count(), 3);
    assert!(chain.validate());
    assert!(chain.verify().is_ok());
    Ok(())
}

#[test]
fn test_admission_threshold() -> Result<(), Box<dyn std::error::Error>> {
    let chain = WorkChain::new(config(1, 5))?;

    submit_certificates(&chain, 0..4);
    let err = chain.mine("miner1").unwrap_err();
    assert_eq!(err, ChainError::InsufficientCertificates { required: 5, available: 4 });
    assert_eq!(chain.block_count(), 1);

    submit_certificates(&chain, 4..7);
    let block = chain.mine("miner1")?;

    let ids: Vec<&str> = block.task_certificates.iter().map(|c| c.task_id.as_str()).collect();
    assert_eq!(ids, vec!["task_0", "task_1", "task_2", "task_3", "task_4"]);

    let left: Vec<String> = chain.pending_certificates().into_iter().map(|c| c.task_id).collect();
    assert_eq!(left, vec!["task_5", "task_6"]);
    Ok(())
}

#[test]
fn test_mining_takes_all_transactions_and_clears_queue() -> Result<(), Box<dyn std::error::Error>> {
    let chain = WorkChain::new(config(1, 1))?;
    submit_certificates(&chain, 0..1);
    for i in 0..20 {
        chain.submit_transaction("A", "B", i);
    }

    let block = chain.mine("miner")?;
    assert_eq!(block.transactions.len(), 21);
    assert_eq!(block.transactions.last(), Some(&Transaction::reward("miner", 5)));
    assert!(chain.pending_transactions().is_empty());
    assert_eq!(chain.latest_block(), block);
    Ok(())
}

#[test]
fn test_mined_hashes_meet_difficulty() -> Result<(), Box<dyn std::error::Error>> {
    for difficulty in 1..=3 {
        let chain = WorkChain::new(config(difficulty, 1))?;
        submit_certificates(&chain, 0..1);
        let block = chain.mine("miner")?;
        assert!(block.hash.starts_with(&"0".repeat(difficulty)));
        assert_eq!(block.hash, block.compute_hash()?);
    }
    Ok(())
}

#[test]
fn test_balances() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    assert_eq!(chain.balance_of("A"), -50);
    assert_eq!(chain.balance_of("B"), 20);
    assert_eq!(chain.balance_of("C"), 30);
    assert_eq!(chain.balance_of("miner1"), 5);
    assert_eq!(chain.balance_of("nobody"), 0);

    let all = chain.balances();
    assert_eq!(all.get("B"), Some(&20));
    assert_eq!(all.get("network"), Some(&-10));
    Ok(())
}

#[test]
fn test_pending_transactions_do_not_affect_balance() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    chain.submit_transaction("C", "A", 30);
    assert_eq!(chain.balance_of("C"), 30);
    Ok(())
}

#[test]
fn test_tampered_amount_detected() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    let mut blocks = chain.blocks();
    blocks[1].transactions[0].amount = 5_000;

    let corrupt = validate_chain(&blocks, 2).unwrap_err();
    assert_eq!(corrupt.index, 1);
    assert!(matches!(corrupt.violation, Violation::HashMismatch { .. }));

    let tampered = WorkChain::from_blocks(config(2, 2), blocks)?;
    assert!(!tampered.validate());
    Ok(())
}

#[test]
fn test_rehashed_tamper_breaks_linkage() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    let mut blocks = chain.blocks();
    blocks[1].transactions[0].amount = 5_000;
    blocks[1].rehash()?;

    let corrupt = validate_chain(&blocks, 2).unwrap_err();
    assert_eq!(corrupt.index, 2);
    assert!(matches!(corrupt.violation, Violation::BrokenLink { .. }));
    Ok(())
}

#[test]
fn test_broken_link_detected() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    let mut blocks = chain.blocks();
    blocks[2].previous_hash = "f".repeat(64);
    blocks[2].rehash()?;

    let corrupt = validate_chain(&blocks, 2).unwrap_err();
    assert_eq!(corrupt.index, 2);
    assert!(corrupt.to_string().contains("Chain broken at block 2"));
    Ok(())
}

#[test]
fn test_certificate_shortfall_detected() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    let mut blocks = chain.blocks();
    blocks[1].task_certificates.pop();
    blocks[1].rehash()?;
    blocks[2].previous_hash = blocks[1].hash.clone();
    blocks[2].rehash()?;

    let corrupt = validate_chain(&blocks, 2).unwrap_err();
    assert_eq!(corrupt.index, 1);
    assert_eq!(
        corrupt.violation,
        Violation::InsufficientCertificates { required: 2, found: 1 }
    );
    Ok(())
}

#[test]
fn test_json_round_trip_preserves_validity() -> Result<(), Box<dyn std::error::Error>> {
    let chain = two_block_chain()?;
    let json = serde_json::to_string(&chain.blocks())?;
    let blocks: Vec<workchain::Block> = serde_json::from_str(&json)?;

    for block in &blocks {
        assert_eq!(block.hash, block.compute_hash()?);
    }
    let restored = WorkChain::from_blocks(config(2, 2), blocks)?;
    assert!(restored.validate());
    assert_eq!(restored.balance_of("C"), 30);
    Ok(())
}

#[test]
fn test_duplicate_task_ids_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let chain = WorkChain::new(config(1, 2))?;
    let issuer = CertificateIssuer::new();
    for _ in 0..2 {
        chain.submit_certificate(issuer.issue("same_task", "Alice", true).ok_or("not issued")?);
    }
    let block = chain.mine("miner")?;
    assert_eq!(block.task_certificates.len(), 2);
    Ok(())
}
