use time::macros::datetime;
use uuid::Uuid;

use plenar_config::Postgres;
use plenar_storage::{
	db::Db,
	models::PreferenceAppend,
	queries::{self, ProtocolFilter},
};
use plenar_testkit::TestDatabase;

const SPEECH_A: Uuid = Uuid::from_u128(0x0000_0001);
const SPEECH_B: Uuid = Uuid::from_u128(0x0000_0002);
const SPEECH_C: Uuid = Uuid::from_u128(0x0000_0003);

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

async fn seed(db: &Db) {
	let statements = [
		"INSERT INTO protocol (id, date, legislatureperiod, number, title) VALUES
			('p-2021-1', '2021-03-01T09:00:00Z', 19, 210, 'Haushalt'),
			('p-2021-2', '2021-12-31T18:00:00Z', 20, 5, NULL),
			('p-2022-1', '2022-01-20T09:00:00Z', 20, 12, 'Gesundheit')",
		"INSERT INTO agendaitem (id, protocolid, title, itemorder, matchag) VALUES
			('a-2', 'p-2021-1', 'Second', 2, 'm-2'),
			('a-1', 'p-2021-1', 'First', 1, 'm-1'),
			('a-3', 'p-2022-1', 'Only', 1, 'm-3')",
		"INSERT INTO speaker (speakerid, fullname) VALUES ('s-1', 'Erika Mustermann')",
	];

	for statement in statements {
		sqlx::query(statement).execute(&db.pool).await.expect("Failed to seed rows.");
	}

	for (id, speaker, match_key, summary, text) in [
		(SPEECH_B, "s-1", "m-1", "Second speech", "Die Apotheke im Dorf"),
		(SPEECH_A, "s-2", "m-1", "First speech", "Die Gesundheit der Patienten"),
		(SPEECH_C, "s-1", "m-3", "Care speech", "Gesundheit und Pflege"),
	] {
		sqlx::query(
			"INSERT INTO speech (nlpspeechid, speakerid, matchag, getabstractsummarypegasus, text)
			VALUES ($1, $2, $3, $4, $5)",
		)
		.bind(id)
		.bind(speaker)
		.bind(match_key)
		.bind(summary)
		.bind(text)
		.execute(&db.pool)
		.await
		.expect("Failed to seed speech.");
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set PLENAR_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	db.ensure_schema().await.expect("Second bootstrap must succeed.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'search_history'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn protocol_filters_and_first_children() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping protocol_filters_and_first_children; set PLENAR_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let all = queries::list_protocols(&db.pool, &ProtocolFilter::default())
		.await
		.expect("Failed to list protocols.");
	let ids: Vec<_> = all.iter().map(|protocol| protocol.id.as_str()).collect();

	assert_eq!(ids, vec!["p-2022-1", "p-2021-2", "p-2021-1"]);
	assert_eq!(all[0].date, datetime!(2022-01-20 09:00 UTC));

	let in_2021 = queries::list_protocols(
		&db.pool,
		&ProtocolFilter { year: Some(2021), ..Default::default() },
	)
	.await
	.expect("Failed to filter by year.");

	// The late December session must fall inside its year.
	assert_eq!(in_2021.len(), 2);

	let combined = queries::list_protocols(
		&db.pool,
		&ProtocolFilter { legislature_period: Some(20), number: Some(12), year: Some(2022) },
	)
	.await
	.expect("Failed to combine filters.");

	assert_eq!(combined.len(), 1);
	assert_eq!(combined[0].id, "p-2022-1");

	let item = queries::first_agenda_item(&db.pool, "p-2021-1")
		.await
		.expect("Failed to fetch first agenda item.")
		.expect("Protocol has agenda items.");

	assert_eq!(item.id, "a-1");

	let speech = queries::first_speech(&db.pool, &item.match_key)
		.await
		.expect("Failed to fetch first speech.")
		.expect("Agenda item has speeches.");

	assert_eq!(speech.speech_id, SPEECH_A);
	assert_eq!(speech.summary.as_deref(), Some("First speech"));
	assert!(
		queries::first_agenda_item(&db.pool, "p-2021-2")
			.await
			.expect("Failed to fetch agenda items.")
			.is_none()
	);

	let speakers = queries::speakers_by_ids(&db.pool, &["s-1".to_string(), "s-2".to_string()])
		.await
		.expect("Failed to fetch speakers.");

	assert_eq!(speakers.len(), 1);
	assert_eq!(speakers[0].full_name, "Erika Mustermann");

	let counts = queries::table_counts(&db.pool).await.expect("Failed to count rows.");

	assert_eq!(
		(counts.protocols, counts.agenda_items, counts.speeches, counts.speakers),
		(3, 3, 3, 1)
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn search_function_pages_protocols() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping search_function_pages_protocols; set PLENAR_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let page = queries::search_speeches(&db.pool, "gesundheit", 0, 9)
		.await
		.expect("Failed to search speeches.");

	assert_eq!(page.total_count, 2);
	assert_eq!(page.protocols.len(), 2);

	let beyond = queries::search_speeches(&db.pool, "gesundheit", 5, 9)
		.await
		.expect("Failed to search past the end.");

	assert_eq!(beyond.total_count, 2);
	assert!(beyond.protocols.is_empty());

	let none = queries::search_speeches(&db.pool, "raumfahrt", 0, 9)
		.await
		.expect("Failed to run empty search.");

	assert_eq!(none.total_count, 0);
	assert!(none.protocols.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn history_and_preferences_round_trip() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping history_and_preferences_round_trip; set PLENAR_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let user_id = Uuid::new_v4();

	sqlx::query("INSERT INTO profiles (id) VALUES ($1)")
		.bind(user_id)
		.execute(&db.pool)
		.await
		.expect("Failed to insert profile.");

	queries::insert_search_history(&db.pool, user_id, "older", datetime!(2024-01-01 10:00 UTC))
		.await
		.expect("Failed to insert history.");
	queries::insert_search_history(&db.pool, user_id, "newer", datetime!(2024-02-01 10:00 UTC))
		.await
		.expect("Failed to insert history.");

	let history =
		queries::list_search_history(&db.pool, user_id).await.expect("Failed to list history.");

	assert_eq!(history, vec!["newer".to_string(), "older".to_string()]);

	let appended = queries::append_preference(
		&db.pool,
		user_id,
		"Energy",
		3,
		datetime!(2024-02-02 10:00 UTC),
	)
	.await
	.expect("Failed to append preference.");

	assert_eq!(appended, PreferenceAppend::Appended(vec!["Energy".to_string()]));

	let preferences = queries::load_preferences(&db.pool, user_id)
		.await
		.expect("Failed to load preferences.")
		.expect("Profile exists.");

	assert_eq!(preferences, vec!["Energy".to_string()]);
	assert_eq!(
		queries::reset_privacy(&db.pool, user_id, datetime!(2024-02-03 10:00 UTC))
			.await
			.expect("Reset failed."),
		2
	);
	assert_eq!(
		queries::load_preferences(&db.pool, user_id).await.expect("Failed to load preferences."),
		Some(vec![])
	);
	assert!(
		queries::load_preferences(&db.pool, Uuid::new_v4())
			.await
			.expect("Failed to load preferences.")
			.is_none()
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn concurrent_preference_appends_are_serialized() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping concurrent_preference_appends_are_serialized; set PLENAR_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let user_id = Uuid::new_v4();
	let now = datetime!(2024-03-01 10:00 UTC);

	sqlx::query("INSERT INTO profiles (id, preferences) VALUES ($1, ARRAY['Energy'])")
		.bind(user_id)
		.execute(&db.pool)
		.await
		.expect("Failed to insert profile.");

	let (health, climate, duplicate) = tokio::join!(
		queries::append_preference(&db.pool, user_id, "Health", 3, now),
		queries::append_preference(&db.pool, user_id, "Climate", 3, now),
		queries::append_preference(&db.pool, user_id, "Energy", 3, now),
	);

	assert!(matches!(health.expect("Append failed."), PreferenceAppend::Appended(_)));
	assert!(matches!(climate.expect("Append failed."), PreferenceAppend::Appended(_)));

	// The duplicate is rejected either because it exists or because the list filled up first.
	assert!(matches!(
		duplicate.expect("Append failed."),
		PreferenceAppend::Duplicate | PreferenceAppend::LimitReached
	));

	let mut stored = queries::load_preferences(&db.pool, user_id)
		.await
		.expect("Failed to load preferences.")
		.expect("Profile exists.");

	stored.sort();

	assert_eq!(stored, vec!["Climate", "Energy", "Health"]);
	assert_eq!(
		queries::append_preference(&db.pool, user_id, "Housing", 3, now)
			.await
			.expect("Append failed."),
		PreferenceAppend::LimitReached
	);
	assert_eq!(
		queries::append_preference(&db.pool, Uuid::new_v4(), "Housing", 3, now)
			.await
			.expect("Append failed."),
		PreferenceAppend::MissingProfile
	);
	assert_eq!(
		queries::remove_preference(&db.pool, user_id, "Health", now)
			.await
			.expect("Remove failed.")
			.map(|preferences| preferences.len()),
		Some(2)
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn privacy_reset_without_profile_rolls_back() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping privacy_reset_without_profile_rolls_back; set PLENAR_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let user_id = Uuid::new_v4();

	queries::insert_search_history(&db.pool, user_id, "doctor", datetime!(2024-01-01 10:00 UTC))
		.await
		.expect("Failed to insert history.");

	let err = queries::reset_privacy(&db.pool, user_id, datetime!(2024-01-02 10:00 UTC))
		.await
		.expect_err("Missing profile must fail.");

	assert!(matches!(err, plenar_storage::Error::NotFound(_)));
	assert_eq!(
		queries::list_search_history(&db.pool, user_id).await.expect("Failed to list history."),
		vec!["doctor".to_string()]
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn sample_reads_return_recent_rows() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping sample_reads_return_recent_rows; set PLENAR_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let protocols =
		queries::recent_protocols(&db.pool, 2).await.expect("Failed to list protocols.");
	let protocol_ids: Vec<String> = protocols.into_iter().map(|protocol| protocol.id).collect();

	assert_eq!(protocol_ids, vec!["p-2022-1".to_string(), "p-2021-2".to_string()]);

	let items = queries::agenda_items_for_protocols(
		&db.pool,
		&["p-2021-1".to_string(), "p-2022-1".to_string()],
	)
	.await
	.expect("Failed to list agenda items.");
	let item_ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();

	assert_eq!(item_ids, vec!["a-1", "a-2", "a-3"]);
	assert!(
		queries::agenda_items_for_protocols(&db.pool, &[])
			.await
			.expect("Failed to list agenda items.")
			.is_empty()
	);

	let speeches = queries::recent_speeches(&db.pool, 2).await.expect("Failed to list speeches.");
	let speech_ids: Vec<Uuid> = speeches.iter().map(|speech| speech.speech_id).collect();

	assert_eq!(speech_ids, vec![SPEECH_C, SPEECH_B]);

	let speakers = queries::list_speakers(&db.pool, 5).await.expect("Failed to list speakers.");

	assert_eq!(speakers.len(), 1);
	assert_eq!(speakers[0].full_name, "Erika Mustermann");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
