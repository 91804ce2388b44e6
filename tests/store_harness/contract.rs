//! Macro-generated conformance suite for `TrackerStore`
//!
//! ## Cards
//! - ids are assigned and positive, listing is ordered by name
//! - partial updates keep untouched fields, credit limits can be cleared
//! - deleting a card cascades to its statements and reports the count
//!
//! ## Statements
//! - creation checks the owning card, listing is ordered by due date desc
//! - status, schedule and notification writes report missing rows
//!
//! ## Concurrency
//! - parallel inserts all land with distinct ids

/// Generate the `TrackerStore` conformance suite.
///
/// `$factory` is evaluated inside each async test, so it may `.await`. For
/// the concurrency test the store must also be `Clone + 'static`.
#[macro_export]
macro_rules! tracker_store_tests {
    ($factory:expr) => {
        mod tracker_store_contract_tests {
            use super::*;
            use card_tracker::core::entity::{CardChanges, CreditLimitChange, NotificationKind};
            use card_tracker::core::lifecycle::PaymentSchedule;

            // ==================================================================
            // Cards
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get_card() {
                let store = $factory;
                let created = store
                    .create_card(new_card("Chase Sapphire", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                assert!(created.id > 0);
                assert_eq!(created.statement_day, 15);
                assert_eq!(created.days_until_due, 25);
                assert_eq!(created.created_at, created.updated_at);

                let fetched = store.get_card(created.id).await.unwrap().unwrap();
                assert_eq!(fetched.name, "Chase Sapphire");
                assert_eq!(fetched.last_four, "4321");
                assert_eq!(fetched.statement_day, 15);
                assert_eq!(fetched.days_until_due, 25);
                assert_eq!(fetched.credit_limit, None);
            }

            #[tokio::test]
            async fn test_get_missing_card() {
                let store = $factory;
                assert!(store.get_card(12345).await.unwrap().is_none());
                assert!(store.list_cards().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_cards_listed_by_name() {
                let store = $factory;
                for name in ["Visa", "Amex", "Mastercard"] {
                    store
                        .create_card(new_card(name, "2024-11-15", "2024-12-10"))
                        .await
                        .unwrap();
                }
                let names: Vec<String> = store
                    .list_cards()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|c| c.name)
                    .collect();
                assert_eq!(names, ["Amex", "Mastercard", "Visa"]);
            }

            #[tokio::test]
            async fn test_partial_update_keeps_other_fields() {
                let store = $factory;
                let mut card = new_card("Chase", "2024-11-15", "2024-12-10");
                card.credit_limit = Some(5000.0);
                let card = store.create_card(card).await.unwrap();

                let changes = CardChanges {
                    last_four: Some("9999".to_string()),
                    ..Default::default()
                };
                let updated = store.update_card(card.id, &changes).await.unwrap().unwrap();
                assert_eq!(updated.name, "Chase");
                assert_eq!(updated.last_four, "9999");
                assert_eq!(updated.statement_day, 15);
                assert_eq!(updated.credit_limit, Some(5000.0));
                assert!(updated.updated_at >= card.updated_at);

                let changes = CardChanges {
                    cycle: Some(BillingCycle::derive(date("2024-11-20"), date("2024-12-05")).unwrap()),
                    credit_limit: CreditLimitChange::Clear,
                    ..Default::default()
                };
                store.update_card(card.id, &changes).await.unwrap().unwrap();
                let stored = store.get_card(card.id).await.unwrap().unwrap();
                assert_eq!(stored.statement_day, 20);
                assert_eq!(stored.days_until_due, 15);
                assert_eq!(stored.credit_limit, None);
                assert_eq!(stored.last_four, "9999");
            }

            #[tokio::test]
            async fn test_update_missing_card() {
                let store = $factory;
                let changes = CardChanges {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                };
                assert!(store.update_card(77, &changes).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_cascades() {
                let store = $factory;
                let doomed = store
                    .create_card(new_card("Doomed", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                let kept = store
                    .create_card(new_card("Kept", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                for due in ["2024-11-15", "2024-11-20"] {
                    store
                        .create_statement(new_statement(doomed.id, due, 10.0))
                        .await
                        .unwrap()
                        .unwrap();
                }
                let survivor = store
                    .create_statement(new_statement(kept.id, "2024-11-25", 20.0))
                    .await
                    .unwrap()
                    .unwrap();

                assert_eq!(store.delete_card(doomed.id).await.unwrap(), Some(2));
                assert!(store.get_card(doomed.id).await.unwrap().is_none());

                let remaining = store.list_statements().await.unwrap();
                assert_eq!(remaining.len(), 1);
                assert_eq!(remaining[0].id, survivor.id);

                assert_eq!(store.delete_card(doomed.id).await.unwrap(), None);
            }

            #[tokio::test]
            async fn test_delete_card_without_statements() {
                let store = $factory;
                let card = store
                    .create_card(new_card("Empty", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                assert_eq!(store.delete_card(card.id).await.unwrap(), Some(0));
            }

            // ==================================================================
            // Statements
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get_statement() {
                let store = $factory;
                let card = store
                    .create_card(new_card("Chase", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                let created = store
                    .create_statement(new_statement(card.id, "2024-11-15", 1500.50))
                    .await
                    .unwrap()
                    .unwrap();
                assert!(created.id > 0);

                let fetched = store.get_statement(created.id).await.unwrap().unwrap();
                assert_eq!(fetched.card_id, card.id);
                assert_eq!(fetched.statement_date, date("2024-11-01"));
                assert_eq!(fetched.due_date, date("2024-11-15"));
                assert_eq!(fetched.amount, 1500.50);
                assert_eq!(fetched.status, "pending");
                assert!(!fetched.notified_statement);
                assert!(!fetched.notified_payment);
                assert!(fetched.schedule.is_none());
            }

            #[tokio::test]
            async fn test_statement_for_missing_card() {
                let store = $factory;
                let result = store
                    .create_statement(new_statement(404, "2024-11-15", 1.0))
                    .await
                    .unwrap();
                assert!(result.is_none());
                assert!(store.list_statements().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_statements_listed_by_due_date_desc() {
                let store = $factory;
                let card = store
                    .create_card(new_card("Chase", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                for due in ["2024-11-10", "2024-12-01", "2024-11-20"] {
                    store
                        .create_statement(new_statement(card.id, due, 5.0))
                        .await
                        .unwrap();
                }
                let dues: Vec<NaiveDate> = store
                    .list_statements()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|s| s.due_date)
                    .collect();
                assert_eq!(dues, [date("2024-12-01"), date("2024-11-20"), date("2024-11-10")]);
            }

            #[tokio::test]
            async fn test_status_update() {
                let store = $factory;
                let card = store
                    .create_card(new_card("Chase", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                let statement = store
                    .create_statement(new_statement(card.id, "2024-11-15", 5.0))
                    .await
                    .unwrap()
                    .unwrap();

                assert!(store.update_statement_status(statement.id, "paid").await.unwrap());
                let stored = store.get_statement(statement.id).await.unwrap().unwrap();
                assert_eq!(stored.status, "paid");

                assert!(!store.update_statement_status(9999, "paid").await.unwrap());
            }

            #[tokio::test]
            async fn test_schedule_payment() {
                let store = $factory;
                let card = store
                    .create_card(new_card("Chase", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                let statement = store
                    .create_statement(new_statement(card.id, "2024-11-15", 5.0))
                    .await
                    .unwrap()
                    .unwrap();

                let schedule = PaymentSchedule::stamp(date("2024-11-12"), Utc::now());
                assert!(store.schedule_payment(statement.id, schedule).await.unwrap());

                let stored = store.get_statement(statement.id).await.unwrap().unwrap();
                assert_eq!(stored.status, "pending");
                let stored_schedule = stored.schedule.unwrap();
                assert_eq!(stored_schedule.scheduled_payment_date, date("2024-11-12"));
                let drift = stored_schedule.reviewed_at - schedule.reviewed_at;
                assert!(drift.num_seconds().abs() < 1);

                assert!(!store.schedule_payment(9999, schedule).await.unwrap());
            }

            #[tokio::test]
            async fn test_mark_notified() {
                let store = $factory;
                let card = store
                    .create_card(new_card("Chase", "2024-11-15", "2024-12-10"))
                    .await
                    .unwrap();
                let statement = store
                    .create_statement(new_statement(card.id, "2024-11-15", 5.0))
                    .await
                    .unwrap()
                    .unwrap();

                assert!(store.mark_notified(statement.id, NotificationKind::Payment).await.unwrap());
                let stored = store.get_statement(statement.id).await.unwrap().unwrap();
                assert!(stored.notified_payment);
                assert!(!stored.notified_statement);

                assert!(store.mark_notified(statement.id, NotificationKind::Statement).await.unwrap());
                let stored = store.get_statement(statement.id).await.unwrap().unwrap();
                assert!(stored.notified_statement);

                assert!(!store.mark_notified(9999, NotificationKind::Statement).await.unwrap());
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_card_inserts() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store
                            .create_card(new_card(&format!("Card {i:02}"), "2024-11-15", "2024-12-10"))
                            .await
                            .unwrap()
                            .id
                    }));
                }

                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap());
                }
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), 10);
                assert_eq!(store.list_cards().await.unwrap().len(), 10);
            }
        }
    };
}
