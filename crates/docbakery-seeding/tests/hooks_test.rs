//! Post-save hooks stay quiet while baking and come back afterwards.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docbakery_seeding::prelude::*;
use helpers::kitchen::{Kitchen, hooked};
use rstest::{fixture, rstest};
use serde_json::Map;

#[fixture]
fn kitchen() -> Kitchen {
	Kitchen::new()
}

#[rstest]
#[tokio::test]
async fn test_hook_does_not_fire_during_make(kitchen: Kitchen) {
	// Arrange
	let fired = Arc::new(AtomicUsize::new(0));
	let schema = hooked("Member", Arc::clone(&fired));
	connect_lifecycle_hook(&kitchen.post_save(), &schema);

	// Act
	kitchen.baker.make(&schema, 3, Overrides::new()).await.unwrap();

	// Assert
	assert_eq!(fired.load(Ordering::SeqCst), 0);
	assert_eq!(kitchen.store.count_of(&schema).await.unwrap(), 3);
}

#[rstest]
#[tokio::test]
async fn test_hook_reconnected_exactly_once_for_sender(kitchen: Kitchen) {
	// Arrange
	let fired = Arc::new(AtomicUsize::new(0));
	let schema = hooked("Member", Arc::clone(&fired));
	let signal = kitchen.post_save();
	connect_lifecycle_hook(&signal, &schema);
	let connects_before = signal.metrics().connects;

	// Act
	kitchen.baker.make_one(&schema, Overrides::new()).await.unwrap();

	// Assert
	assert!(signal.is_connected("Member_post_save", Some("Member")));
	assert_eq!(signal.receiver_count_for("Member"), 1);
	assert_eq!(signal.metrics().connects - connects_before, 1);
}

#[rstest]
#[tokio::test]
async fn test_hook_fires_again_after_make(kitchen: Kitchen) {
	// Arrange
	let fired = Arc::new(AtomicUsize::new(0));
	let schema = hooked("Member", Arc::clone(&fired));
	connect_lifecycle_hook(&kitchen.post_save(), &schema);
	kitchen.baker.make_one(&schema, Overrides::new()).await.unwrap();
	let mut outside = DocumentInstance::construct(Arc::clone(&schema), Map::new()).unwrap();

	// Act
	kitchen.store.persist(&mut outside).await.unwrap();

	// Assert
	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_hook_restored_when_make_fails(kitchen: Kitchen) {
	// Arrange
	let fired = Arc::new(AtomicUsize::new(0));
	let schema = hooked("Member", fired);
	let signal = kitchen.post_save();
	connect_lifecycle_hook(&signal, &schema);
	kitchen.store.set_available(false);

	// Act
	let result = kitchen.baker.make(&schema, 1, Overrides::new()).await;

	// Assert
	assert!(result.is_err());
	assert!(signal.is_connected("Member_post_save", Some("Member")));
	assert_eq!(signal.receiver_count_for("Member"), 1);
}

#[rstest]
#[tokio::test]
async fn test_referenced_schema_hook_is_suspended_too(kitchen: Kitchen) {
	// Arrange
	let fired = Arc::new(AtomicUsize::new(0));
	let team = hooked("Team", Arc::clone(&fired));
	let player = Schema::document("Player")
		.field(FieldDescriptor::text("name").required())
		.field(FieldDescriptor::reference("team", Arc::clone(&team)).required())
		.build();
	let signal = kitchen.post_save();
	connect_lifecycle_hook(&signal, &team);

	// Act
	kitchen.baker.make(&player, 2, Overrides::new()).await.unwrap();

	// Assert
	assert_eq!(fired.load(Ordering::SeqCst), 0);
	assert_eq!(kitchen.store.count_of(&team).await.unwrap(), 2);
	assert_eq!(signal.receiver_count_for("Team"), 1);
}

#[rstest]
#[tokio::test]
async fn test_other_schemas_keep_their_hooks(kitchen: Kitchen) {
	// Arrange
	let member_fired = Arc::new(AtomicUsize::new(0));
	let guest_fired = Arc::new(AtomicUsize::new(0));
	let member = hooked("Member", Arc::clone(&member_fired));
	let guest = hooked("Guest", Arc::clone(&guest_fired));
	let signal = kitchen.post_save();
	connect_lifecycle_hook(&signal, &member);
	connect_lifecycle_hook(&signal, &guest);

	// Act
	kitchen.baker.make_one(&member, Overrides::new()).await.unwrap();
	let mut visitor = DocumentInstance::construct(guest, Map::new()).unwrap();
	kitchen.store.persist(&mut visitor).await.unwrap();

	// Assert
	assert_eq!(member_fired.load(Ordering::SeqCst), 0);
	assert_eq!(guest_fired.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_hook_never_connected_is_connected_after_make(kitchen: Kitchen) {
	let schema = hooked("Member", Arc::new(AtomicUsize::new(0)));
	let signal = kitchen.post_save();

	kitchen.baker.make_one(&schema, Overrides::new()).await.unwrap();

	assert_eq!(signal.receiver_count_for("Member"), 1);
}
