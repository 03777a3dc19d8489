use uuid::Uuid;

use shrike_service::{AdjudicateRequest, Error};

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set SHRIKE_PG_DSN and SHRIKE_QDRANT_URL to run."]
async fn verdicts_are_validated_and_idempotent() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping verdicts_are_validated_and_idempotent; set SHRIKE_PG_DSN to run.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!("Skipping verdicts_are_validated_and_idempotent; set SHRIKE_QDRANT_URL to run.");

		return;
	};
	let collection = test_db.collection_name("shrike_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service =
		super::build_service(cfg, super::stub_providers()).await.expect("Failed to build service.");
	let ingested = service
		.ingest(super::ingest_request("feed-1", "item-1", "Explosion reported near the bridge."))
		.await
		.expect("Ingest failed.");

	// Bad verdicts are rejected before anything is written.
	let rejected = service
		.adjudicate(ingested.item_id, AdjudicateRequest { verdict: "plausible".to_string() })
		.await;

	assert!(matches!(rejected, Err(Error::InvalidRequest { .. })));

	let confirmed_items: i64 = sqlx::query_scalar("SELECT confirmed_items FROM sources")
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to read source counter.");

	assert_eq!(confirmed_items, 0);

	// Unknown items are a not-found, not a silent no-op.
	let missing = service
		.adjudicate(Uuid::new_v4(), AdjudicateRequest { verdict: "confirmed".to_string() })
		.await;

	assert!(matches!(missing, Err(Error::NotFound { .. })));

	// Repeating the same verdict must not double-count.
	let first = service
		.adjudicate(ingested.item_id, AdjudicateRequest { verdict: "confirmed".to_string() })
		.await
		.expect("First adjudication failed.");
	let second = service
		.adjudicate(ingested.item_id, AdjudicateRequest { verdict: "confirmed".to_string() })
		.await
		.expect("Second adjudication failed.");

	assert_eq!(first.source_reliability, 1.0);
	assert_eq!(second.source_reliability, 1.0);

	let confirmed_items: i64 = sqlx::query_scalar("SELECT confirmed_items FROM sources")
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to read source counter.");

	assert_eq!(confirmed_items, 1);

	// Walking the verdict back releases the count again.
	let unknown = service
		.adjudicate(ingested.item_id, AdjudicateRequest { verdict: "unknown".to_string() })
		.await
		.expect("Adjudication failed.");

	assert_eq!(unknown.source_reliability, 0.5);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set SHRIKE_PG_DSN and SHRIKE_QDRANT_URL to run."]
async fn review_and_replay_ingest_can_run_concurrently() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping review_and_replay_ingest_can_run_concurrently; set SHRIKE_PG_DSN to run.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!(
			"Skipping review_and_replay_ingest_can_run_concurrently; set SHRIKE_QDRANT_URL to run."
		);

		return;
	};
	let collection = test_db.collection_name("shrike_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service =
		super::build_service(cfg, super::stub_providers()).await.expect("Failed to build service.");
	let request = super::ingest_request("feed-1", "item-1", "Explosion reported near the bridge.");
	let ingested = service.ingest(request.clone()).await.expect("Ingest failed.");

	// A review and a replay of the same item race item and source row locks.
	// Both transactions must complete instead of deadlocking.
	let review =
		service.adjudicate(ingested.item_id, AdjudicateRequest { verdict: "confirmed".to_string() });
	let replay = service.ingest(request);
	let (review, replay) = tokio::join!(review, replay);
	let review = review.expect("Adjudication failed.");
	let replay = replay.expect("Replay ingest failed.");

	assert_eq!(replay.item_id, ingested.item_id);
	assert_eq!(review.verdict, "confirmed");

	// The verdict survives whichever order the two transactions committed in.
	let verdict: Option<String> =
		sqlx::query_scalar("SELECT meta->'review'->>'verdict' FROM items WHERE item_id = $1")
			.bind(ingested.item_id)
			.fetch_one(&service.db.pool)
			.await
			.expect("Failed to read verdict.");

	assert_eq!(verdict.as_deref(), Some("confirmed"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
