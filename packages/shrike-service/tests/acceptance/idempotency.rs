use super::unit_vector;

#[tokio::test]
#[ignore = "Requires external Postgres and Qdrant. Set SHRIKE_PG_DSN and SHRIKE_QDRANT_URL to run."]
async fn reingesting_an_item_creates_nothing_new() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping reingesting_an_item_creates_nothing_new; set SHRIKE_PG_DSN to run.");

		return;
	};
	let Some(qdrant_url) = super::test_qdrant_url() else {
		eprintln!("Skipping reingesting_an_item_creates_nothing_new; set SHRIKE_QDRANT_URL to run.");

		return;
	};
	let collection = test_db.collection_name("shrike_acceptance");
	let cfg = super::test_config(test_db.dsn().to_string(), qdrant_url, collection);
	let service =
		super::build_service(cfg, super::stub_providers()).await.expect("Failed to build service.");

	let request = super::ingest_request("feed-1", "item-1", "Explosion reported near the bridge.");
	let first = service.ingest(request.clone()).await.expect("First ingest failed.");

	assert!(first.created_event);
	assert!(first.linked);

	// With the event document indexed, a replay of the same item must land on
	// the same event instead of opening a second one.
	let event = shrike_storage::queries::get_event(&service.db.pool, first.event_id)
		.await
		.expect("Failed to load event.")
		.expect("Event missing.");

	super::index_event(&service, event.event_id, unit_vector(), &event.r#type, event.occurred_at)
		.await;

	let second = service.ingest(request).await.expect("Second ingest failed.");

	assert_eq!(second.item_id, first.item_id);
	assert_eq!(second.event_id, first.event_id);
	assert!(!second.created_event);

	let item_count: i64 = sqlx::query_scalar("SELECT count(*) FROM items")
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to count items.");
	let link_count: i64 = sqlx::query_scalar("SELECT count(*) FROM evidence_links")
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to count links.");
	let total_items: i64 = sqlx::query_scalar("SELECT total_items FROM sources")
		.fetch_one(&service.db.pool)
		.await
		.expect("Failed to read source counter.");

	assert_eq!(item_count, 1);
	assert_eq!(link_count, 1);
	assert_eq!(total_items, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
