//! Racing submissions against a shared gate.

use presence_gate::{
    AuthorizationGate, GateConfig, IssueOutcome, MemoryStore, Rejection, SubjectId, Verdict,
    VerifyOutcome,
};
use std::sync::{Arc, Barrier};
use std::thread;

const RACERS: usize = 8;

#[test]
fn duplicate_submissions_consume_challenge_once() {
    let gate = Arc::new(
        AuthorizationGate::new(GateConfig::default(), Arc::new(MemoryStore::new())).unwrap(),
    );
    let subject = SubjectId::from("42");
    let code = match gate.issue(&subject).unwrap() {
        IssueOutcome::Issued(secret) => secret.into_string(),
        other => panic!("expected Issued, got {:?}", other),
    };

    let barrier = Arc::new(Barrier::new(RACERS));
    let handles: Vec<_> = (0..RACERS)
        .map(|_| {
            let gate = gate.clone();
            let barrier = barrier.clone();
            let subject = subject.clone();
            let code = code.clone();
            thread::spawn(move || {
                barrier.wait();
                gate.verify(&subject, &code)
            })
        })
        .collect();

    let outcomes: Vec<VerifyOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let granted = outcomes.iter().filter(|o| o.is_authorized()).count();
    assert_eq!(granted, 1);
    assert!(outcomes.iter().all(|o| o.is_authorized()
        || *o == VerifyOutcome::Rejected(Rejection::NoActiveChallenge)));

    // Losing duplicates must not count against the winner.
    assert_eq!(gate.failure_count(&subject), 0);
    assert_eq!(gate.guard(&subject), Verdict::Allowed);
}

#[test]
fn independent_subjects_all_succeed() {
    let store = Arc::new(MemoryStore::new());
    let gate = Arc::new(AuthorizationGate::new(GateConfig::default(), store.clone()).unwrap());

    let handles: Vec<_> = (0..RACERS)
        .map(|i| {
            let gate = gate.clone();
            thread::spawn(move || {
                let subject = SubjectId::from(i as u64);
                let code = match gate.issue(&subject).unwrap() {
                    IssueOutcome::Issued(secret) => secret,
                    other => panic!("expected Issued, got {:?}", other),
                };
                gate.verify(&subject, code.expose())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_authorized());
    }

    assert_eq!(gate.authorized_count(), RACERS);
    // The last save must carry every grant.
    assert_eq!(
        store.snapshot().unwrap().authorized_subjects().len(),
        RACERS
    );
}
