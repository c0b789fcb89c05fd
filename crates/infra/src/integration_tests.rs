//! End-to-end tests over the in-memory stack.
//!
//! Directory → Engine (splits, ledger, token transfer) → EventBus
//!
//! Verifies:
//! - Expenses become netted pairwise debts
//! - Settlements move tokens before touching the ledger
//! - Failed operations change nothing and publish nothing
//! - Groups stay isolated under concurrent use

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use splitledger_core::{Amount, GroupId, LedgerError, MemberId};
    use splitledger_engine::{ExpenseRequest, LedgerEvent, TransferError};
    use splitledger_events::EventBus;
    use splitledger_splits::SplitMethod;

    use crate::bootstrap::{InMemoryStack, build_in_memory};
    use crate::clock::FixedClock;
    use crate::config::EngineConfig;

    fn member(name: &str) -> MemberId {
        MemberId::new(name).unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn stack() -> (InMemoryStack<FixedClock>, GroupId) {
        stack_with(&EngineConfig::default())
    }

    fn stack_with(config: &EngineConfig) -> (InMemoryStack<FixedClock>, GroupId) {
        let stack = build_in_memory(config, Arc::new(FixedClock::new(start()))).unwrap();
        let group = stack
            .directory
            .create_group(
                "weekend-trip",
                &member("alice"),
                &[member("alice"), member("bob"), member("carol"), member("dave")],
            )
            .unwrap();
        (stack, group)
    }

    fn fund(stack: &InMemoryStack<FixedClock>, name: &str, amount: Amount) {
        stack.token.mint(&member(name), amount).unwrap();
        stack.token.approve(&member(name), amount).unwrap();
    }

    fn expense(group: &GroupId, payer: &str, amount: Amount, method: SplitMethod, debtors: &[&str], params: &[Amount]) -> ExpenseRequest {
        ExpenseRequest {
            group: group.clone(),
            amount,
            description: "shared cost".to_string(),
            date: start() - Duration::hours(2),
            payer: member(payer),
            method,
            debtors: debtors.iter().map(|d| member(d)).collect(),
            params: params.to_vec(),
        }
    }

    #[test]
    fn group_membership_lifecycle() {
        let (stack, group) = stack();

        assert_eq!(
            stack.directory.join_group(&group, &member("bob")).unwrap_err(),
            LedgerError::AlreadyMember {
                group: group.clone(),
                member: member("bob"),
            }
        );
        assert_eq!(
            stack
                .directory
                .create_group("weekend-trip", &member("erin"), &[member("bob")])
                .unwrap_err(),
            LedgerError::GroupAlreadyExists(group.clone())
        );

        // Not yet a member: cannot be a debtor.
        let request = expense(&group, "alice", 20, SplitMethod::Equal, &["erin"], &[]);
        assert_eq!(
            stack.engine.process_expense(&request).unwrap_err(),
            LedgerError::not_a_member(&group, &member("erin"))
        );

        stack.directory.join_group(&group, &member("erin")).unwrap();
        stack.engine.process_expense(&request).unwrap();
        assert_eq!(stack.engine.query_owed(&group, &member("erin"), &member("alice")).unwrap(), 20);
    }

    #[test]
    fn equal_split_then_funded_settlement() {
        let (stack, group) = stack();
        fund(&stack, "bob", 500);
        let subscription = stack.bus.subscribe();

        let receipt = stack
            .engine
            .process_expense(&expense(&group, "alice", 100, SplitMethod::Equal, &["bob", "carol", "dave"], &[]))
            .unwrap();
        assert_eq!(receipt.shares.get(&member("bob")), Some(34));
        assert_eq!(receipt.shares.get(&member("carol")), Some(33));
        assert_eq!(receipt.shares.get(&member("dave")), Some(33));

        let settled = stack
            .engine
            .settle_debt(&group, &member("bob"), &member("alice"), 1_000)
            .unwrap();

        assert_eq!(settled, 34);
        assert_eq!(stack.engine.query_owed(&group, &member("bob"), &member("alice")).unwrap(), 0);
        assert_eq!(stack.token.balance_of(&member("bob")).unwrap(), 466);
        assert_eq!(stack.token.balance_of(&member("alice")).unwrap(), 34);
        assert_eq!(stack.token.allowance(&member("bob")).unwrap(), 466);

        assert_eq!(
            stack.engine.settle_debt(&group, &member("bob"), &member("alice"), 34).unwrap_err(),
            LedgerError::no_such_debt(&member("bob"), &member("alice"))
        );

        let events: Vec<_> = subscription.drain().into_iter().map(|e| e.into_payload()).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], LedgerEvent::ExpenseRecorded(e) if e.amount == 100));
        assert!(matches!(&events[1], LedgerEvent::DebtSettled(e) if e.settled == 34 && e.remaining == 0));
    }

    #[test]
    fn percentage_split_floors_and_hands_remainder_to_first_debtor() {
        let (stack, group) = stack();

        stack
            .engine
            .process_expense(&expense(&group, "alice", 50, SplitMethod::Percentage, &["bob", "carol"], &[33, 67]))
            .unwrap();

        assert_eq!(stack.engine.query_owed(&group, &member("bob"), &member("alice")).unwrap(), 17);
        assert_eq!(stack.engine.query_owed(&group, &member("carol"), &member("alice")).unwrap(), 33);
    }

    #[test]
    fn opposing_expenses_are_netted() {
        let (stack, group) = stack();

        stack
            .engine
            .process_expense(&expense(&group, "bob", 150, SplitMethod::Exact, &["alice"], &[150]))
            .unwrap();
        stack
            .engine
            .process_expense(&expense(&group, "alice", 50, SplitMethod::Exact, &["bob"], &[50]))
            .unwrap();

        assert_eq!(stack.engine.query_owed(&group, &member("alice"), &member("bob")).unwrap(), 100);
        assert_eq!(stack.engine.query_owed(&group, &member("bob"), &member("alice")).unwrap(), 0);
        assert_eq!(stack.engine.debts(&group).unwrap().len(), 1);

        let bob = stack.engine.balance_of(&group, &member("bob")).unwrap();
        assert_eq!(bob.net(), 100);
    }

    #[test]
    fn unfunded_settlement_leaves_everything_untouched() {
        let (stack, group) = stack();
        stack.token.mint(&member("bob"), 100).unwrap();
        stack.token.approve(&member("bob"), 10).unwrap();
        stack
            .engine
            .process_expense(&expense(&group, "alice", 60, SplitMethod::Exact, &["bob"], &[60]))
            .unwrap();
        let subscription = stack.bus.subscribe();

        let err = stack
            .engine
            .settle_debt(&group, &member("bob"), &member("alice"), 60)
            .unwrap_err();

        let expected = TransferError::InsufficientAllowance {
            account: member("bob"),
            approved: 10,
            required: 60,
        };
        assert_eq!(err, LedgerError::transfer_failed(expected.to_string()));
        assert_eq!(stack.engine.query_owed(&group, &member("bob"), &member("alice")).unwrap(), 60);
        assert_eq!(stack.token.balance_of(&member("bob")).unwrap(), 100);
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn configured_tolerance_admits_clock_skew() {
        let mut skewed = expense(&GroupId::new("weekend-trip").unwrap(), "alice", 10, SplitMethod::Equal, &["bob"], &[]);
        skewed.date = start() + Duration::seconds(30);

        let (strict, _) = stack();
        assert!(matches!(
            strict.engine.process_expense(&skewed),
            Err(LedgerError::FutureDate { .. })
        ));

        let config = EngineConfig::from_json(r#"{"future_date_tolerance_secs": 60}"#).unwrap();
        let (lenient, _) = stack_with(&config);
        assert!(lenient.engine.process_expense(&skewed).is_ok());
    }

    #[test]
    fn unbounded_tolerance_never_fails_on_dates() {
        let config = EngineConfig::from_json(r#"{"future_date_tolerance_secs": 100000000000000}"#).unwrap();
        let (stack, group) = stack_with(&config);

        let past = expense(&group, "alice", 10, SplitMethod::Equal, &["bob"], &[]);
        assert!(stack.engine.process_expense(&past).is_ok());

        let mut future = expense(&group, "alice", 10, SplitMethod::Equal, &["bob"], &[]);
        future.date = start() + Duration::days(3650);
        assert!(stack.engine.process_expense(&future).is_ok());
        assert_eq!(stack.engine.query_owed(&group, &member("bob"), &member("alice")).unwrap(), 20);
    }

    #[test]
    fn creator_outside_the_member_list_joins_later() {
        let (stack, _) = stack();
        let owner = member("owner");
        let group = stack
            .directory
            .create_group("Weekend Trip", &owner, &[member("bob"), member("carol")])
            .unwrap();

        let request = expense(&group, "owner", 40, SplitMethod::Equal, &["bob", "carol"], &[]);
        assert_eq!(
            stack.engine.process_expense(&request).unwrap_err(),
            LedgerError::not_a_member(&group, &owner)
        );

        stack.directory.join_group(&group, &owner).unwrap();
        stack.engine.process_expense(&request).unwrap();
        assert_eq!(stack.engine.query_owed(&group, &member("bob"), &owner).unwrap(), 20);
    }

    #[test]
    fn building_the_stack_installs_a_subscriber() {
        let _ = stack();
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn concurrent_groups_stay_isolated() {
        let (stack, trip) = stack();
        let flat = stack
            .directory
            .create_group("flat", &member("alice"), &[member("alice"), member("bob")])
            .unwrap();

        std::thread::scope(|scope| {
            for group in [&trip, &flat] {
                for _ in 0..4 {
                    let engine = &stack.engine;
                    scope.spawn(move || {
                        for _ in 0..25 {
                            engine
                                .process_expense(&expense(group, "alice", 2, SplitMethod::Exact, &["bob"], &[2]))
                                .unwrap();
                        }
                    });
                }
            }
        });

        assert_eq!(stack.engine.query_owed(&trip, &member("bob"), &member("alice")).unwrap(), 200);
        assert_eq!(stack.engine.query_owed(&flat, &member("bob"), &member("alice")).unwrap(), 200);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Expense { payer: usize, debtor: usize, amount: Amount },
        Settle { sender: usize, receiver: usize, amount: Amount },
    }

    const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..4usize, 0..4usize, 1u128..1_000).prop_map(|(payer, debtor, amount)| Step::Expense { payer, debtor, amount }),
            (0..4usize, 0..4usize, 1u128..1_000).prop_map(|(sender, receiver, amount)| Step::Settle { sender, receiver, amount }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: after any mix of expenses and settlements every pair is
        /// netted and the members' net positions sum to zero.
        #[test]
        fn arbitrary_histories_keep_pairs_netted(steps in prop::collection::vec(step(), 1..40)) {
            let (stack, group) = stack();
            for name in NAMES {
                fund(&stack, name, 1_000_000);
            }

            for step in steps {
                match step {
                    Step::Expense { payer, debtor, amount } => {
                        let request = expense(&group, NAMES[payer], amount, SplitMethod::Equal, &[NAMES[debtor]], &[]);
                        stack.engine.process_expense(&request).unwrap();
                    }
                    Step::Settle { sender, receiver, amount } => {
                        let owed = stack.engine.query_owed(&group, &member(NAMES[sender]), &member(NAMES[receiver])).unwrap();
                        let result = stack.engine.settle_debt(&group, &member(NAMES[sender]), &member(NAMES[receiver]), amount);
                        if sender == receiver || owed == 0 {
                            prop_assert!(result.is_err());
                        } else {
                            prop_assert_eq!(result.unwrap(), owed.min(amount));
                        }
                    }
                }
            }

            for a in NAMES {
                for b in NAMES {
                    let ab = stack.engine.query_owed(&group, &member(a), &member(b)).unwrap();
                    let ba = stack.engine.query_owed(&group, &member(b), &member(a)).unwrap();
                    prop_assert!(ab == 0 || ba == 0);
                }
            }
            let total: i128 = NAMES
                .iter()
                .map(|name| stack.engine.balance_of(&group, &member(name)).unwrap().net())
                .sum();
            prop_assert_eq!(total, 0);
        }
    }
}
