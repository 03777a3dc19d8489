use shrike_service::AdjudicateRequest;

use super::unit_vector;

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set SHRIKE_PG_DSN and SHRIKE_QDRANT_URL to run."]
async fn corroboration_and_conflict_drive_event_status() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping corroboration_and_conflict_drive_event_status; set SHRIKE_PG_DSN to run.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping corroboration_and_conflict_drive_event_status; set SHRIKE_QDRANT_URL to run."
		);

		return;
	};
	let collection = test_db.collection_name("shrike_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service =
		super::build_service(cfg, super::stub_providers()).await.expect("Failed to build service.");

	// First report opens the event.
	let first = service
		.ingest(super::ingest_request("feed-1", "item-1", "Explosion reported near the bridge."))
		.await
		.expect("First ingest failed.");

	assert!(first.created_event);

	let event = shrike_storage::queries::get_event(&service.db.pool, first.event_id)
		.await
		.expect("Failed to load event.")
		.expect("Event missing.");

	assert_eq!(event.status, "pending");

	super::index_event(&service, event.event_id, unit_vector(), &event.r#type, event.occurred_at)
		.await;

	// Second report from another source merges into the same event.
	let second = service
		.ingest(super::ingest_request("feed-2", "item-2", "Smoke rising after a blast downtown."))
		.await
		.expect("Second ingest failed.");

	assert_eq!(second.event_id, first.event_id);
	assert!(!second.created_event);

	// Confirming the first item settles the event.
	let confirmed = service
		.adjudicate(first.item_id, AdjudicateRequest { verdict: "confirmed".to_string() })
		.await
		.expect("Adjudication failed.");

	assert_eq!(confirmed.source_reliability, 1.0);
	assert_eq!(confirmed.updated_events.len(), 1);
	assert_eq!(confirmed.updated_events[0].status, "confirmed");

	// A conflicting verdict reverts it to pending.
	let disproved = service
		.adjudicate(second.item_id, AdjudicateRequest { verdict: "disproved".to_string() })
		.await
		.expect("Adjudication failed.");

	assert_eq!(disproved.source_reliability, 0.0);
	assert_eq!(disproved.updated_events[0].status, "pending");

	let evidence = service.list_evidence(first.event_id).await.expect("Evidence listing failed.");

	assert_eq!(evidence.status, "pending");
	assert_eq!(evidence.evidence.len(), 2);

	let verdicts = evidence
		.evidence
		.iter()
		.map(|entry| entry.item_verdict.as_deref().unwrap_or("unknown"))
		.collect::<Vec<_>>();

	assert!(verdicts.contains(&"confirmed"));
	assert!(verdicts.contains(&"disproved"));
	// Evidence weights come from the reported credibility, nothing else.
	assert!(evidence.evidence.iter().all(|entry| entry.weight == Some(0.8)));

	// Withdrawing the conflicting verdict flips the event back to confirmed.
	let withdrawn = service
		.adjudicate(second.item_id, AdjudicateRequest { verdict: "unknown".to_string() })
		.await
		.expect("Adjudication failed.");

	assert_eq!(withdrawn.source_reliability, 0.5);
	assert_eq!(withdrawn.updated_events[0].status, "confirmed");

	let evidence = service.list_evidence(first.event_id).await.expect("Evidence listing failed.");

	assert_eq!(evidence.status, "confirmed");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
