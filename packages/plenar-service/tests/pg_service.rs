use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use plenar_config::Config;
use plenar_service::{ListRequest, PlenarService, PreferenceRequest, SearchRequest, SessionUser};
use plenar_testkit::TestDatabase;

fn test_config(dsn: &str) -> Config {
	Config {
		service: plenar_config::Service { log_level: "info".to_string() },
		storage: plenar_config::Storage {
			postgres: plenar_config::Postgres { dsn: dsn.to_string(), pool_max_conns: 2 },
		},
		graph: plenar_config::Graph {
			url: "http://127.0.0.1:7474".to_string(),
			database: "neo4j".to_string(),
			username: "neo4j".to_string(),
			password: "secret".to_string(),
			timeout_ms: 1_000,
			max_attempts: 1,
			initial_delay_ms: 10,
			constraints: Vec::new(),
		},
		search: plenar_config::Search { page_size: 9, home_page_size: 3 },
		profile: plenar_config::Profile { max_preferences: 5 },
		translation: plenar_config::Translation {
			dictionary: BTreeMap::from([("health".to_string(), "gesundheit".to_string())]),
		},
	}
}

async fn seed(pool: &PgPool, user_id: Uuid) {
	for statement in [
		"INSERT INTO protocol (id, date, legislatureperiod, number, title) VALUES
			('p-1', '2022-01-20T09:00:00Z', 20, 12, 'Gesundheit'),
			('p-2', '2022-02-20T09:00:00Z', 20, 13, NULL)",
		"INSERT INTO agendaitem (id, protocolid, title, itemorder, matchag) VALUES
			('a-1', 'p-1', 'Pflege', 1, 'm-1')",
	] {
		sqlx::query(statement).execute(pool).await.expect("Failed to seed rows.");
	}

	sqlx::query(
		"INSERT INTO speech (nlpspeechid, speakerid, matchag, getabstractsummarypegasus, text)
		VALUES ($1, 's-1', 'm-1', 'Pflege braucht Personal', 'Die Gesundheit der Pflegekräfte')",
	)
	.bind(Uuid::from_u128(1))
	.execute(pool)
	.await
	.expect("Failed to seed speech.");
	sqlx::query("INSERT INTO profiles (id) VALUES ($1)")
		.bind(user_id)
		.execute(pool)
		.await
		.expect("Failed to seed profile.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PLENAR_PG_DSN to run."]
async fn service_reads_and_writes_through_postgres() {
	let Some(base_dsn) = plenar_testkit::env_dsn() else {
		eprintln!("Skipping service_reads_and_writes_through_postgres; set PLENAR_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service =
		PlenarService::connect(test_config(test_db.dsn())).await.expect("Failed to connect.");
	let pool = PgPool::connect(test_db.dsn()).await.expect("Failed to open seed pool.");
	let user_id = Uuid::new_v4();

	seed(&pool, user_id).await;

	let listing = service.list(ListRequest::default()).await.expect("Failed to list protocols.");

	assert_eq!(listing.total, 2);
	assert_eq!(listing.items[0].id, "p-2");
	assert_eq!(listing.items[0].first_speech_summary, "");
	assert_eq!(listing.items[1].first_speech_summary, "Pflege braucht Personal");

	let found = service
		.search(
			SessionUser::User(user_id),
			SearchRequest { query: "Health".to_string(), page: 0 },
		)
		.await
		.expect("Failed to search.");

	assert_eq!(found.search_query, "gesundheit");
	assert_eq!(found.total_count, 1);
	assert_eq!(found.items[0].first_speech_id, Some(Uuid::from_u128(1)));

	service
		.add_preference(PreferenceRequest { user_id, preference: "Pflege".to_string() })
		.await
		.expect("Failed to add preference.");

	let profile = service.interest_profile(user_id).await.expect("Failed to load profile.");

	assert_eq!(profile.history, vec!["Health"]);
	assert_eq!(profile.keywords, vec!["Health", "Pflege"]);
	assert_eq!(service.reset_privacy(user_id).await.expect("Failed to reset privacy."), 1);

	let counts = service.data_counts().await.expect("Failed to count rows.");

	assert_eq!(counts.protocols, 2);

	let sample = service.sample_data().await.expect("Failed to sample rows.");
	let protocol_ids: Vec<&str> =
		sample.recent_protocols.iter().map(|sample| sample.protocol.id.as_str()).collect();

	assert_eq!(protocol_ids, vec!["p-2", "p-1"]);
	assert!(sample.recent_protocols[0].agenda_items.is_empty());
	assert_eq!(sample.recent_protocols[1].agenda_items[0].id, "a-1");
	assert_eq!(sample.recent_speeches[0].speaker_name, "Speaker s-1");
	assert!(sample.speakers.is_empty());

	pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
