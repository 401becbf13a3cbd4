//! Walks the full approval flow once: an agent prompts for a risky shell
//! command, the guard admits it, a human approves, the signed decision lands
//! in the audit chain, and a replayed prompt is turned away.

use consentry_chain::{verify_record_signature, AuditChain};
use consentry_crypto::{DecisionSigner, KeyPair};
use consentry_guard::ReplayGuard;
use consentry_types::{
    ActionRequest, ActionType, Component, DecisionKind, DeviceStatus, EventId, EventSource,
    PromptEvent, RiskLevel, StatusEvent,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let guard = ReplayGuard::new();
    let signer = DecisionSigner::new(KeyPair::generate());
    let chain = AuditChain::new();

    tracing::info!(signer = %signer.public_key_base64(), "approver provisioned");

    // The agent comes online.
    let source = EventSource::new(Component::Agent, "demo-session");
    let status = StatusEvent {
        id: EventId::new(),
        timestamp: consentry_types::current_timestamp_ms(),
        source: source.clone(),
        status: DeviceStatus::Online,
        metrics: None,
        message: Some("agent ready".to_string()),
    };
    chain.append_status(&status).expect("status append");

    // The agent asks to run a destructive command.
    let prompt = PromptEvent::new(
        source,
        ActionRequest::new(ActionType::Shell, "rm -rf /tmp/build-cache"),
        RiskLevel::High,
    );

    match guard.admit_prompt(&prompt) {
        Ok(()) => tracing::info!(prompt_id = %prompt.id, "prompt admitted"),
        Err(e) => {
            tracing::error!(error = %e, "prompt rejected");
            return;
        }
    }

    // A human approves it; the signed decision is chained.
    let decision = signer.make_decision(
        prompt.id.clone(),
        DecisionKind::Approve,
        None,
        Some("cache is disposable".to_string()),
    );
    let record = chain.append_decision(&decision).expect("decision append");
    tracing::info!(record_id = %record.id, hash = %record.hash, "decision audited");

    // The same prompt arrives again - a replay.
    if let Err(e) = guard.admit_prompt(&prompt) {
        tracing::info!(error = %e, "replayed prompt turned away");
    }

    // Anyone holding the records can re-check everything.
    let records = chain.records();
    let verification = consentry_chain::verify_chain(&records);
    tracing::info!(
        records = records.len(),
        valid = verification.valid,
        "chain replayed"
    );

    let known_keys = [signer.public_key_base64()];
    for record in &records {
        tracing::info!(
            record_id = %record.id,
            event_type = %record.event_type,
            signature_ok = verify_record_signature(record, &known_keys),
            "record checked"
        );
    }
}
