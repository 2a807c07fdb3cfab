use ethernity_core::utils::ether;
use ethernity_detector_threat::detectors::poisoning::CallPattern;
use ethernity_detector_threat::detectors::spoofing::address_similarity;
use ethernity_detector_threat::detectors::{
    AbnormalValueDetector, CrossChainAttackDetector, FlashLoanDetector, FrontRunningDetector,
    GovernanceAttackDetector, HoneypotDetector, OracleManipulationDetector, PhishingDetector, PoisoningDetector,
    ReentrancyDetector, SpoofingDetector,
};
use ethernity_detector_threat::{
    AuxiliaryContext, CallRecord, DetectionConfig, EvaluationContext, Evidence, Finding, Log, RuleEvaluator,
    RuleKind, Selector, SignatureRegistry, Trace, Transaction,
};
use ethernity_detector_threat::trace::{AccountState, StateSnapshot};

const BLACKLISTED: &str = "0xd90e2f925da726b50c4ed8d0fb90ad053324f31b";
const ATTACKER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const VICTIM: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
const PROVIDER: &str = "0xdbf03b407c01e7cd3cbea99509d93f8dddc8c6fb";
const ROUTER: &str = "0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb";

fn calldata(signature: &str, words: &[&str]) -> String {
    let mut data = Selector::from_signature(signature).to_hex();
    for word in words {
        data.push_str(&format!("{:0>64}", word.trim_start_matches("0x")));
    }
    data
}

fn evaluate(detector: &dyn RuleEvaluator, tx: &Transaction) -> Option<Finding> {
    let config = DetectionConfig::default();
    let registry = SignatureRegistry::default();
    let ctx = EvaluationContext {
        tx,
        config: &config,
        registry: &registry,
        legitimacy: None,
    };
    let finding = detector.evaluate(&ctx);
    if let Some(finding) = &finding {
        assert_eq!(finding.kind(), detector.kind());
    }
    finding
}

fn tx_with_calls(from: &str, to: &str, calls: Vec<CallRecord>) -> Transaction {
    let mut trace = Trace::new(from, to);
    trace.calls = calls;
    Transaction::new(trace)
}

#[test]
fn spoofing_records_blacklisted_address() {
    let tx = Transaction::new(Trace::new(ATTACKER, &BLACKLISTED.to_uppercase().replace("0X", "0x")));
    let finding = evaluate(&SpoofingDetector::new(), &tx).expect("spoofing deveria disparar");
    match finding.evidence {
        Evidence::Spoofing(evidence) => assert_eq!(evidence.blacklisted_addresses, vec![BLACKLISTED]),
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn similarity_boundaries() {
    let a = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    let b = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaee";
    assert!(address_similarity(a, b) > 0.7);
    assert_eq!(
        address_similarity(
            "0x0000000000000000000000000000000000000000",
            "0x1111111111111111111111111111111111111111"
        ),
        0.0
    );
}

#[test]
fn spoofing_flags_lookalike_addresses() {
    let tx = Transaction::new(Trace::new(
        "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
        "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaee",
    ));
    let finding = evaluate(&SpoofingDetector::new(), &tx).expect("spoofing deveria disparar");
    match finding.evidence {
        Evidence::Spoofing(evidence) => {
            assert!(evidence.blacklisted_addresses.is_empty());
            assert!(evidence.address_similarity.unwrap() > 0.9);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn spoofing_ignores_identical_addresses() {
    let tx = Transaction::new(Trace::new(ATTACKER, ATTACKER));
    assert!(evaluate(&SpoofingDetector::new(), &tx).is_none());
}

#[test]
fn phishing_unlimited_approval_to_blacklisted_spender() {
    let mut trace = Trace::new(VICTIM, ROUTER);
    trace.input = Some(calldata("approve(address,uint256)", &[BLACKLISTED, "f".repeat(64).as_str()]));
    let finding = evaluate(&PhishingDetector::new(), &Transaction::new(trace)).expect("phishing deveria disparar");

    assert_eq!(finding.classification.as_deref(), Some("unlimited_approval"));
    assert!(finding.message.contains("blacklisted"));
    match finding.evidence {
        Evidence::Phishing(evidence) => {
            assert_eq!(evidence.approval_target.as_deref(), Some(BLACKLISTED));
            assert!(evidence.approval_target_blacklisted);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn phishing_ignores_bounded_approval() {
    let mut trace = Trace::new(VICTIM, ROUTER);
    trace.input = Some(calldata("approve(address,uint256)", &[ATTACKER, "0de0b6b3a7640000"]));
    assert!(evaluate(&PhishingDetector::new(), &Transaction::new(trace)).is_none());
}

#[test]
fn phishing_flags_ownership_transfer_log() {
    let registry = SignatureRegistry::default();
    let mut trace = Trace::new(ATTACKER, ROUTER);
    trace.logs = vec![Log {
        address: Some(ROUTER.to_string()),
        topics: vec![
            registry.ownership_transferred_topic().to_string(),
            format!("0x{:0>64}", VICTIM.trim_start_matches("0x")),
            format!("0x{:0>64}", ATTACKER.trim_start_matches("0x")),
        ],
        data: None,
    }];

    let finding = evaluate(&PhishingDetector::new(), &Transaction::new(trace)).expect("phishing deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("ownership_transfer"));
    match finding.evidence {
        Evidence::Phishing(evidence) => {
            assert_eq!(evidence.ownership_transfers.len(), 1);
            assert_eq!(evidence.ownership_transfers[0].new_owner.as_deref(), Some(ATTACKER));
            assert!(!evidence.ownership_transfers[0].new_owner_blacklisted);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn poisoning_flags_call_patterns() {
    let mut calls: Vec<CallRecord> = (0..5).map(|_| CallRecord::new(ATTACKER, ROUTER)).collect();
    calls.extend((0..4).map(|_| CallRecord::new(ATTACKER, PROVIDER)));
    let tx = tx_with_calls(ATTACKER, ROUTER, calls);

    let finding = evaluate(&PoisoningDetector::new(), &tx).expect("poisoning deveria disparar");
    match finding.evidence {
        Evidence::Poisoning(evidence) => {
            assert!(evidence.matched_signature.is_none());
            assert!(evidence
                .suspicious_patterns
                .contains(&CallPattern::ExcessiveCalls { count: 9, limit: 8 }));
            let repeated: Vec<_> = evidence
                .suspicious_patterns
                .iter()
                .filter(|p| matches!(p, CallPattern::RepeatedTarget { .. }))
                .collect();
            assert_eq!(repeated.len(), 2);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn poisoning_flags_output_amplification() {
    let call = CallRecord::new(ATTACKER, ROUTER)
        .with_input("0x12345678")
        .with_output(format!("0x{}", "ab".repeat(401)));
    let tx = tx_with_calls(ATTACKER, ROUTER, vec![call]);

    let finding = evaluate(&PoisoningDetector::new(), &tx).expect("poisoning deveria disparar");
    match finding.evidence {
        Evidence::Poisoning(evidence) => assert_eq!(
            evidence.suspicious_patterns,
            vec![CallPattern::OutputAmplification {
                call_index: 0,
                input_bytes: 4,
                output_bytes: 401
            }]
        ),
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn reentrancy_cycle_contains_both_parties() {
    let a = ATTACKER;
    let b = VICTIM;
    let tx = tx_with_calls(
        a,
        b,
        vec![
            CallRecord::new(a, b),
            CallRecord::new(b, a).with_value(ether(1)),
            CallRecord::new(a, b),
        ],
    );

    let finding = evaluate(&ReentrancyDetector::new(), &tx).expect("reentrancy deveria disparar");
    match finding.evidence {
        Evidence::Reentrancy(evidence) => {
            assert!(evidence
                .paths
                .iter()
                .any(|path| path.iter().any(|n| n == a) && path.iter().any(|n| n == b)));
            assert_eq!(evidence.patterns[0].pattern, "callback_cycle");
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn reentrancy_reports_write_after_call() {
    let withdraw = calldata("withdraw(uint256)", &["01"]);
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![
            CallRecord::new(ATTACKER, VICTIM).with_input(withdraw.clone()),
            CallRecord::new(VICTIM, ATTACKER).with_value(ether(1)),
            CallRecord::new(ATTACKER, VICTIM).with_input(withdraw),
        ],
    );

    let finding = evaluate(&ReentrancyDetector::new(), &tx).expect("reentrancy deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("write_after_call"));
    match finding.evidence {
        Evidence::Reentrancy(evidence) => {
            let names: Vec<&str> = evidence.patterns.iter().map(|p| p.pattern.as_str()).collect();
            assert_eq!(names, vec!["write_after_call", "multiple_withdrawals"]);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn reentrancy_reports_nested_value_transfers() {
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![
            CallRecord::new(ATTACKER, VICTIM).with_value(ether(1)),
            CallRecord::new(VICTIM, ATTACKER).with_value(ether(2)),
        ],
    );

    let finding = evaluate(&ReentrancyDetector::new(), &tx).expect("reentrancy deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("nested_value_transfers"));
    match finding.evidence {
        Evidence::Reentrancy(evidence) => {
            let names: Vec<&str> = evidence.patterns.iter().map(|p| p.pattern.as_str()).collect();
            assert_eq!(names, vec!["nested_value_transfers"]);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn reentrancy_skips_known_false_positive() {
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![CallRecord::new(ATTACKER, VICTIM).with_value(ether(1))],
    )
    .with_context(AuxiliaryContext {
        known_false_positive: Some(true),
        ..Default::default()
    });
    assert!(evaluate(&ReentrancyDetector::new(), &tx).is_none());
}

#[test]
fn frontrunning_classifies_transfer_gas_spike() {
    let mut trace = Trace::new(ATTACKER, ROUTER);
    trace.input = Some(calldata("transfer(address,uint256)", &[VICTIM, "01"]));
    trace.gas = Some("2000000".to_string());
    let finding = evaluate(&FrontRunningDetector::new(), &Transaction::new(trace.clone())).unwrap();
    assert_eq!(finding.classification.as_deref(), Some("transfer_gas_spike"));

    trace.gas = Some("1500000".to_string());
    let finding = evaluate(&FrontRunningDetector::new(), &Transaction::new(trace.clone())).unwrap();
    assert_eq!(finding.classification.as_deref(), Some("high_gas"));
    match finding.evidence {
        Evidence::FrontRunning(evidence) => {
            assert_eq!(evidence.gas, "1500000");
            assert_eq!(evidence.baseline, 21_000);
            assert!(evidence.deviation_percent > 7000.0);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }

    trace.gas = Some("1000000".to_string());
    assert!(evaluate(&FrontRunningDetector::new(), &Transaction::new(trace)).is_none());
}

#[test]
fn abnormal_value_accepts_hex_quantities() {
    let mut trace = Trace::new(ATTACKER, VICTIM);
    trace.value = Some("0x56bc75e2d63100001".to_string());
    assert!(evaluate(&AbnormalValueDetector::new(), &Transaction::new(trace)).is_some());
}

#[test]
fn flash_loan_borrow_repay_shape() {
    let tx = tx_with_calls(
        ATTACKER,
        ROUTER,
        vec![
            CallRecord::new(PROVIDER, ATTACKER).with_value(ether(500)),
            CallRecord::new(ATTACKER, ROUTER).with_value(ether(1)),
            CallRecord::new(ATTACKER, PROVIDER).with_value(ether(496)),
        ],
    );

    let finding = evaluate(&FlashLoanDetector::new(), &tx).expect("flash loan deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("borrow_repay"));
    match finding.evidence {
        Evidence::FlashLoan(evidence) => {
            let pair = evidence.borrow_repay.unwrap();
            assert_eq!(pair.lender, PROVIDER);
            assert_eq!(pair.borrower, ATTACKER);
            assert!(evidence.flash_loan_calls.is_empty());
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn flash_loan_ignores_partial_repayment() {
    let tx = tx_with_calls(
        ATTACKER,
        ROUTER,
        vec![
            CallRecord::new(PROVIDER, ATTACKER).with_value(ether(500)),
            CallRecord::new(ATTACKER, PROVIDER).with_value(ether(400)),
        ],
    );
    assert!(evaluate(&FlashLoanDetector::new(), &tx).is_none());
}

#[test]
fn flash_loan_signature_found_in_nested_call() {
    let nested = CallRecord::new(ROUTER, PROVIDER)
        .with_input(calldata("flashLoanSimple(address,address,uint256,bytes,uint16)", &[]));
    let tx = tx_with_calls(
        ATTACKER,
        ROUTER,
        vec![CallRecord::new(ATTACKER, ROUTER).with_calls(vec![nested])],
    );
    let finding = evaluate(&FlashLoanDetector::new(), &tx).expect("flash loan deveria disparar");
    match finding.evidence {
        Evidence::FlashLoan(evidence) => {
            assert_eq!(evidence.flash_loan_calls[0].provider.as_deref(), Some(PROVIDER));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn honeypot_flags_withdraw_without_output() {
    let blocked = CallRecord::new(ATTACKER, VICTIM).with_input(calldata("withdraw(uint256)", &["01"]));
    let healthy = CallRecord::new(ATTACKER, ROUTER)
        .with_input(calldata("withdraw(uint256)", &["01"]))
        .with_output(format!("0x{:0>64}", "1"));
    let tx = tx_with_calls(ATTACKER, VICTIM, vec![healthy, blocked]);

    let finding = evaluate(&HoneypotDetector::new(), &tx).expect("honeypot deveria disparar");
    match finding.evidence {
        Evidence::Honeypot(evidence) => {
            assert_eq!(evidence.blocked_withdrawals.len(), 1);
            assert_eq!(evidence.blocked_withdrawals[0].contract.as_deref(), Some(VICTIM));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn honeypot_flags_reverted_withdraw() {
    let reverted = CallRecord {
        error: Some("execution reverted".to_string()),
        ..CallRecord::new(ATTACKER, VICTIM)
            .with_input(calldata("withdraw()", &[]))
            .with_output(format!("0x{:0>64}", "0"))
    };
    let tx = tx_with_calls(ATTACKER, VICTIM, vec![reverted]);

    let finding = evaluate(&HoneypotDetector::new(), &tx).expect("honeypot deveria disparar");
    match finding.evidence {
        Evidence::Honeypot(evidence) => {
            assert_eq!(evidence.blocked_withdrawals.len(), 1);
            assert!(evidence.blocked_withdrawals[0].reverted);
            assert_eq!(evidence.blocked_withdrawals[0].caller.as_deref(), Some(ATTACKER));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn governance_treasury_drain_at_depth() {
    let drain = CallRecord::new(ROUTER, PROVIDER)
        .with_input(calldata("transfer(address,uint256)", &[ATTACKER, "6c6b935b8bbd400000"]));
    let timelock = CallRecord::new(VICTIM, ROUTER).with_calls(vec![CallRecord::new(ROUTER, ROUTER).with_calls(vec![drain])]);

    let mut trace = Trace::new(ATTACKER, VICTIM);
    trace.input = Some(calldata("execute(uint256)", &["07"]));
    trace.calls = vec![timelock];

    let finding = evaluate(&GovernanceAttackDetector::new(), &Transaction::new(trace))
        .expect("governança deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("treasury_drain"));
    match finding.evidence {
        Evidence::GovernanceAttack(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["treasury_drain"]);
            assert_eq!(evidence.drained_amount, Some(ether(2_000).to_string()));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn governance_flags_flash_loan_vote() {
    let mut trace = Trace::new(ATTACKER, VICTIM);
    trace.input = Some(calldata("castVote(uint256,bool)", &["07", "01"]));
    trace.calls = vec![CallRecord::new(VICTIM, PROVIDER)
        .with_input(calldata("flashLoan(address,address,uint256,bytes)", &[]))];

    let finding = evaluate(&GovernanceAttackDetector::new(), &Transaction::new(trace))
        .expect("governança deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("flash_loan_governance"));
    match finding.evidence {
        Evidence::GovernanceAttack(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["flash_loan_governance"]);
            assert_eq!(evidence.drained_amount, None);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn governance_vote_buying_and_timelock_bypass() {
    let transfer = || CallRecord::new(ATTACKER, ROUTER).with_input(calldata("transfer(address,uint256)", &[VICTIM, "01"]));
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![
            transfer(),
            transfer(),
            transfer(),
            CallRecord::new(ATTACKER, VICTIM).with_input(calldata("castVote(uint256,bool)", &["01", "01"])),
            CallRecord::new(ATTACKER, VICTIM).with_input(calldata("setDelay(uint256)", &["00"])),
        ],
    );

    let finding = evaluate(&GovernanceAttackDetector::new(), &tx).expect("governança deveria disparar");
    match finding.evidence {
        Evidence::GovernanceAttack(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["vote_buying", "timelock_bypass"]);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn governance_requires_a_governance_action() {
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![CallRecord::new(ATTACKER, VICTIM).with_input(calldata("setDelay(uint256)", &["00"]))],
    );
    assert!(evaluate(&GovernanceAttackDetector::new(), &tx).is_none());
}

#[test]
fn oracle_sandwich_and_stale_read() {
    let swap = || CallRecord::new(ATTACKER, ROUTER).with_input(calldata("swap(uint256,uint256,address,bytes)", &[]));
    let tx = tx_with_calls(
        ATTACKER,
        ROUTER,
        vec![
            swap(),
            CallRecord::new(ATTACKER, PROVIDER).with_input(calldata("sync()", &[])),
            swap(),
            CallRecord::new(ROUTER, PROVIDER)
                .with_input(calldata("latestRoundData()", &[]))
                .with_gas_used(5_000),
        ],
    );

    let finding = evaluate(&OracleManipulationDetector::new(), &tx).expect("oracle deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("sandwich"));
    match finding.evidence {
        Evidence::OracleManipulation(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["sandwich", "stale_oracle_read"]);
            assert_eq!(evidence.stale_reads, vec![PROVIDER]);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn oracle_flash_loan_with_large_swap() {
    let tx = tx_with_calls(
        ATTACKER,
        ROUTER,
        vec![
            CallRecord::new(ATTACKER, PROVIDER).with_input(calldata("flashLoan(address,address,uint256,bytes)", &[])),
            CallRecord::new(ATTACKER, PROVIDER).with_input(calldata("getPrice(address)", &[VICTIM])),
            CallRecord::new(ATTACKER, ROUTER)
                .with_input(calldata("swap(uint256,uint256,address,bytes)", &[]))
                .with_value(ether(150)),
        ],
    );

    let finding = evaluate(&OracleManipulationDetector::new(), &tx).expect("oracle deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("flash_loan_oracle_swap"));
    match finding.evidence {
        Evidence::OracleManipulation(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["flash_loan_oracle_swap"]);
            assert_eq!(evidence.swap_count, 1);
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn oracle_small_swap_after_flash_loan_is_ignored() {
    let tx = tx_with_calls(
        ATTACKER,
        ROUTER,
        vec![
            CallRecord::new(ATTACKER, PROVIDER).with_input(calldata("flashLoan(address,address,uint256,bytes)", &[])),
            CallRecord::new(ATTACKER, PROVIDER).with_input(calldata("getPrice(address)", &[VICTIM])),
            CallRecord::new(ATTACKER, ROUTER)
                .with_input(calldata("swap(uint256,uint256,address,bytes)", &[]))
                .with_value(ether(100)),
        ],
    );
    assert!(evaluate(&OracleManipulationDetector::new(), &tx).is_none());
}

#[test]
fn oracle_price_jump_from_state_snapshots() {
    let snapshot = |value: &str| {
        let mut state = AccountState::default();
        state.storage.insert("0x0".to_string(), value.to_string());
        let mut snapshot = StateSnapshot::new();
        snapshot.insert(ROUTER.to_string(), state);
        snapshot
    };
    let mut trace = Trace::new(ATTACKER, ROUTER);
    trace.pre = Some(snapshot("1000"));
    trace.post = Some(snapshot("0x7d0"));

    let finding = evaluate(&OracleManipulationDetector::new(), &Transaction::new(trace))
        .expect("oracle deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("price_jump"));
    match finding.evidence {
        Evidence::OracleManipulation(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["price_jump"]);
            assert_eq!(evidence.price_jumps.len(), 1);
            assert_eq!(evidence.price_jumps[0].address, ROUTER);
            assert_eq!(evidence.price_jumps[0].before, "1000");
            assert_eq!(evidence.price_jumps[0].after, "2000");
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn cross_chain_bridge_without_enough_validation() {
    let mut trace = Trace::new(ATTACKER, VICTIM);
    trace.input = Some(calldata("relayMessage(address,address,bytes,uint256)", &[]));
    trace.calls = vec![CallRecord::new(VICTIM, PROVIDER)
        .with_input(calldata("verifyProof(bytes32,bytes32[],bytes32)", &[]))
        .with_gas_used(50_000)];
    let tx = Transaction::new(trace).with_context(AuxiliaryContext {
        source_chain_price: Some(100.0),
        destination_chain_price: Some(130.0),
        source_locked_amount: Some("1000".to_string()),
        destination_minted_amount: Some("0x3e9".to_string()),
        original_message: Some("0xabcd".to_string()),
        altered_message: Some("0xabce".to_string()),
        ..Default::default()
    });

    let finding = evaluate(&CrossChainAttackDetector::new(), &tx).expect("cross-chain deveria disparar");
    match finding.evidence {
        Evidence::CrossChainAttack(evidence) => {
            assert_eq!(
                evidence.suspicious_patterns,
                vec![
                    "insufficient_validation",
                    "message_tampering",
                    "price_inconsistency",
                    "supply_mismatch"
                ]
            );
            assert_eq!(evidence.verification_calls, Some(1));
            assert_eq!(evidence.minted_amount.as_deref(), Some("1001"));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn cross_chain_unauthorized_withdrawal_and_replay() {
    let mut tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![CallRecord::new(VICTIM, ATTACKER).with_value(ether(500))],
    )
    .with_context(AuxiliaryContext {
        original_chain_id: Some(56),
        ..Default::default()
    });
    tx.chain_id = Some(1);

    let finding = evaluate(&CrossChainAttackDetector::new(), &tx).expect("cross-chain deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("unauthorized_withdrawal"));
    match finding.evidence {
        Evidence::CrossChainAttack(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["unauthorized_withdrawal", "replay"]);
            assert_eq!(evidence.withdrawn_amount, Some(ether(500).to_string()));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn cross_chain_cheap_proof_without_bridge_call() {
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![CallRecord::new(VICTIM, PROVIDER)
            .with_input(calldata("verifyProof(bytes32,bytes32[],bytes32)", &[]))
            .with_gas_used(5_000)],
    );

    let finding = evaluate(&CrossChainAttackDetector::new(), &tx).expect("cross-chain deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("insufficient_validation"));
    match finding.evidence {
        Evidence::CrossChainAttack(evidence) => {
            assert_eq!(evidence.suspicious_patterns, vec!["insufficient_validation"]);
            assert_eq!(evidence.verification_calls, Some(1));
        }
        other => panic!("evidência inesperada: {:?}", other),
    }
}

#[test]
fn cross_chain_single_proof_outside_bridge_is_enough() {
    let tx = tx_with_calls(
        ATTACKER,
        VICTIM,
        vec![CallRecord::new(VICTIM, PROVIDER)
            .with_input(calldata("verifyProof(bytes32,bytes32[],bytes32)", &[]))
            .with_gas_used(50_000)],
    );
    assert!(evaluate(&CrossChainAttackDetector::new(), &tx).is_none());
}

#[test]
fn cross_chain_message_case_only_matters_for_text() {
    let context = |original: &str, altered: &str| AuxiliaryContext {
        original_message: Some(original.to_string()),
        altered_message: Some(altered.to_string()),
        ..Default::default()
    };
    let plain = || Transaction::new(Trace::new(ATTACKER, VICTIM));

    assert!(evaluate(&CrossChainAttackDetector::new(), &plain().with_context(context("0xABCD", "0xabcd"))).is_none());

    let finding = evaluate(&CrossChainAttackDetector::new(), &plain().with_context(context("Pay", "pay")))
        .expect("cross-chain deveria disparar");
    assert_eq!(finding.classification.as_deref(), Some("message_tampering"));
}

#[test]
fn cross_chain_tolerates_small_price_deviation() {
    let tx = Transaction::new(Trace::new(ATTACKER, VICTIM)).with_context(AuxiliaryContext {
        source_chain_price: Some(100.0),
        destination_chain_price: Some(115.0),
        ..Default::default()
    });
    assert!(evaluate(&CrossChainAttackDetector::new(), &tx).is_none());
}

#[test]
fn finding_kind_follows_evidence_variant() {
    let tx = Transaction::new(Trace::new(ATTACKER, BLACKLISTED));
    let finding = evaluate(&SpoofingDetector::new(), &tx).unwrap();
    assert_eq!(finding.kind(), RuleKind::Spoofing);
}
