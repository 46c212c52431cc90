use sift_query::{Predicate, QueryError, Schema};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq)]
struct Account {
    balance: i64,
    tier: String,
    referrer: Option<String>,
}

fn account(balance: i64, tier: &str) -> Account {
    Account {
        balance,
        tier: tier.to_string(),
        referrer: None,
    }
}

fn account_schema() -> Schema<Account> {
    Schema::<Account>::builder()
        .ordered_field("balance", |a| &a.balance)
        .field("tier", |a| &a.tier)
        .optional_field("referrer", |a| a.referrer.as_ref())
        .build()
        .unwrap()
}

fn matching<'a>(records: &'a [Account], predicate: &Predicate<Account>) -> Vec<&'a Account> {
    records.iter().filter(|r| predicate.test(r)).collect()
}

#[test]
fn test_free_accounts_within_balance() {
    let schema = account_schema();
    let query = Predicate::within(&schema, "balance", 0i64, 100i64)
        .unwrap()
        .and([Predicate::equals(&schema, "tier", "free".to_string()).unwrap()]);

    let records = vec![account(50, "free"), account(150, "free"), account(50, "pro")];

    assert_eq!(matching(&records, &query), vec![&account(50, "free")]);
}

#[test]
fn test_xor_of_exclusive_tiers() {
    let schema = account_schema();
    let free = Predicate::equals(&schema, "tier", "free".to_string()).unwrap();
    let pro = Predicate::equals(&schema, "tier", "pro".to_string()).unwrap();
    let query = free.xor([pro]);

    let records = vec![
        account(0, "free"),
        account(0, "pro"),
        account(0, "enterprise"),
    ];

    assert_eq!(
        matching(&records, &query),
        vec![&account(0, "free"), &account(0, "pro")]
    );
}

#[test]
fn test_range_boundaries() {
    let schema = account_schema();
    let range = Predicate::within(&schema, "balance", -10i64, 10i64).unwrap();

    assert!(range.test(&account(-10, "free")));
    assert!(range.test(&account(10, "free")));
    assert!(!range.test(&account(-11, "free")));
    assert!(!range.test(&account(11, "free")));
}

#[test]
fn test_equality_on_absent_values() {
    let schema = account_schema();
    let unreferred = Predicate::equals::<String>(&schema, "referrer", None).unwrap();
    let by_alice = Predicate::equals(&schema, "referrer", "alice".to_string()).unwrap();

    let mut referred = account(1, "free");
    referred.referrer = Some("alice".to_string());
    let plain = account(1, "free");

    assert!(unreferred.test(&plain));
    assert!(!unreferred.test(&referred));
    assert!(by_alice.test(&referred));
    assert!(!by_alice.test(&plain));
}

#[test]
fn test_unknown_property_fails_before_evaluation() {
    let schema = account_schema();
    let evaluated = Arc::new(AtomicUsize::new(0));

    let probe = {
        let evaluated = Arc::clone(&evaluated);
        Predicate::from_fn(move |_: &Account| {
            evaluated.fetch_add(1, Ordering::SeqCst);
            true
        })
    };

    let equals = Predicate::equals(&schema, "credit", 10i64);
    let within = Predicate::within(&schema, "credit", 0i64, 10i64);

    assert!(matches!(equals, Err(QueryError::UnknownProperty { .. })));
    assert!(matches!(within, Err(QueryError::UnknownProperty { .. })));
    assert_eq!(evaluated.load(Ordering::SeqCst), 0);

    // The probe itself is still usable; nothing ran during the failed builds.
    assert!(probe.test(&account(0, "free")));
    assert_eq!(evaluated.load(Ordering::SeqCst), 1);
}

#[test]
fn test_declared_type_must_match() {
    let schema = account_schema();
    let err = Predicate::within(&schema, "balance", 0i32, 10i32).unwrap_err();
    assert!(err.is_resolution());
    assert!(matches!(err, QueryError::TypeMismatch { .. }));
}

#[test]
fn test_range_over_unordered_field() {
    let schema = account_schema();
    let err = Predicate::within(&schema, "tier", "a".to_string(), "z".to_string()).unwrap_err();
    assert!(matches!(err, QueryError::NotOrderable { .. }));
}

#[test]
fn test_and_never_evaluates_after_false() {
    let schema = account_schema();
    let probed = Arc::new(AtomicUsize::new(0));
    let probe = {
        let probed = Arc::clone(&probed);
        Predicate::from_fn(move |_: &Account| {
            probed.fetch_add(1, Ordering::SeqCst);
            true
        })
    };

    let never = Predicate::equals(&schema, "tier", "nobody".to_string()).unwrap();
    let query = never.and([probe]);

    for record in [account(1, "free"), account(2, "pro")] {
        assert!(!query.test(&record));
    }
    assert_eq!(probed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_base_predicate_reused_across_queries() {
    let schema = account_schema();
    let solvent = Predicate::within(&schema, "balance", 0i64, i64::MAX).unwrap();
    let free = solvent.and([Predicate::equals(&schema, "tier", "free".to_string()).unwrap()]);
    let pro = solvent.and([Predicate::equals(&schema, "tier", "pro".to_string()).unwrap()]);

    let record = account(5, "pro");
    assert!(solvent.test(&record));
    assert!(!free.test(&record));
    assert!(pro.test(&record));
}

#[test]
fn test_shared_predicate_across_threads() {
    let schema = account_schema();
    let query = Predicate::within(&schema, "balance", 0i64, 99i64)
        .unwrap()
        .or([Predicate::equals(&schema, "tier", "pro".to_string()).unwrap()]);

    let records: Vec<Account> = (0..200)
        .map(|i| account(i, if i % 3 == 0 { "pro" } else { "free" }))
        .collect();
    let expected = matching(&records, &query).len();

    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| matching(&records, &query).len()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(counts.iter().all(|&c| c == expected));
}
