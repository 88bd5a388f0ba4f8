//! Concurrent `make` calls sharing one baker.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docbakery_seeding::prelude::*;
use futures::future::join_all;
use helpers::kitchen::{Kitchen, hooked};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_makes_never_fire_suspended_hook() {
	// Arrange
	let kitchen = Arc::new(Kitchen::new());
	let fired = Arc::new(AtomicUsize::new(0));
	let schema = hooked("Member", Arc::clone(&fired));
	let signal = kitchen.post_save();
	connect_lifecycle_hook(&signal, &schema);

	// Act
	let tasks = (0..16).map(|_| {
		let kitchen = Arc::clone(&kitchen);
		let schema = Arc::clone(&schema);
		tokio::spawn(async move { kitchen.baker.make(&schema, 2, Overrides::new()).await })
	});
	let results = join_all(tasks).await;

	// Assert
	for result in results {
		assert!(result.unwrap().is_ok());
	}
	assert_eq!(fired.load(Ordering::SeqCst), 0);
	assert_eq!(kitchen.baker.ledger_len(), 32);
	assert_eq!(kitchen.store.count_of(&schema).await.unwrap(), 32);
	assert_eq!(signal.receiver_count_for("Member"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cross_linked_schemas_do_not_deadlock() {
	// Arrange
	let kitchen = Arc::new(Kitchen::new());
	let team = Schema::document("Team")
		.field(FieldDescriptor::text("name").required())
		.build();
	let player = Schema::document("Player")
		.field(FieldDescriptor::text("name").required())
		.field(FieldDescriptor::reference("team", Arc::clone(&team)).required())
		.build();

	// Act
	let tasks = (0..8).map(|i| {
		let kitchen = Arc::clone(&kitchen);
		let schema = if i % 2 == 0 {
			Arc::clone(&team)
		} else {
			Arc::clone(&player)
		};
		tokio::spawn(async move { kitchen.baker.make(&schema, 1, Overrides::new()).await })
	});
	let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), join_all(tasks)).await;

	// Assert
	let results = outcome.expect("makes finished");
	assert!(results.into_iter().all(|r| r.unwrap().is_ok()));
	assert_eq!(kitchen.store.count_of(&team).await.unwrap(), 8);
	assert_eq!(kitchen.store.count_of(&player).await.unwrap(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unlocked_baker_still_restores_hooks() {
	// Arrange
	let kitchen = Arc::new(Kitchen::with_settings(
		BakerSettings::default().with_lock_per_schema(false),
	));
	let schema = hooked("Member", Arc::new(AtomicUsize::new(0)));
	let signal = kitchen.post_save();
	connect_lifecycle_hook(&signal, &schema);

	// Act
	let tasks = (0..8).map(|_| {
		let kitchen = Arc::clone(&kitchen);
		let schema = Arc::clone(&schema);
		tokio::spawn(async move { kitchen.baker.make(&schema, 1, Overrides::new()).await })
	});
	join_all(tasks).await;

	// Assert
	assert_eq!(signal.receiver_count_for("Member"), 1);
	assert_eq!(kitchen.baker.ledger_len(), 8);
}
