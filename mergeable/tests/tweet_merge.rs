//! End-to-end merge scenarios over a tweet-like fixture entity.

use std::borrow::Cow;

use serde_json::json;

use mergeable::{
    FieldDescriptor, InMemoryStore, MergeError, MergeExecutor, Record, SemanticType, Store,
    StoreError, TypeDescriptor, augment,
};

fn tweet_type() -> TypeDescriptor {
    TypeDescriptor::new("Tweet")
        .field(FieldDescriptor::new("id", SemanticType::Scalar("i64".into())).identity())
        .field(FieldDescriptor::new("version", SemanticType::Scalar("i32".into())).version())
        .field(FieldDescriptor::new("author", SemanticType::Scalar("String".into())))
        .field(FieldDescriptor::new("content", SemanticType::Scalar("String".into())))
        .field(FieldDescriptor::new(
            "retweets",
            SemanticType::Collection(Box::new(SemanticType::EntityRef("Tweet".into()))),
        ))
        .field(FieldDescriptor::new("original", SemanticType::EntityRef("Tweet".into())))
}

fn persisted_tweet(
    store: &mut impl Store,
    author: Option<&str>,
    content: Option<&str>,
) -> Record {
    let mut record = Record::new("Tweet")
        .with_value("author", author.map_or(json!(null), |a| json!(a)))
        .with_value("content", content.map_or(json!(null), |c| json!(c)));
    store.persist(&mut record).expect("persist fixture tweet");
    record
}

#[test]
fn mergeable_fields_skip_roles_and_collections() {
    let augmentation = augment(&tweet_type()).unwrap();
    let merge = augmentation.merge_method().unwrap();

    let copied: Vec<&str> = merge
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            mergeable::Stmt::CopyFirstNonNull { field } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(copied, vec!["author", "content", "original"]);
}

#[test]
fn merge_takes_the_first_non_null_value() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, None, None);
    let mut b = persisted_tweet(&mut store, Some("bob"), Some("hi"));

    let product = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();

    assert_eq!(product.value("author"), &json!("bob"));
    assert_eq!(product.value("content"), &json!("hi"));
}

#[test]
fn merge_prefers_the_primary_value() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), Some("hello"));

    let product = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();

    // The second value is simply discarded, not reported as a conflict.
    assert_eq!(product.value("author"), &json!("alice"));
    assert_eq!(product.value("content"), &json!("hello"));
}

#[test]
fn merge_leaves_both_null_fields_null() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), None);

    let product = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();
    assert!(product.value("content").is_null());
}

#[test]
fn merge_tracks_provenance_on_all_three_records() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), Some("hello"));

    let product = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();

    assert_eq!(product.merge_main_reference, a.id);
    assert_eq!(product.merge_second_reference, b.id);
    assert_eq!(a.merge_result, product.id);
    assert_eq!(b.merge_result, product.id);

    assert!(product.is_merge_result());
    assert!(!product.was_merged());
    assert!(a.was_merged());
    assert!(b.was_merged());
    assert!(!a.is_merge_result());
    assert!(!b.is_merge_result());

    // The store copies of the sources carry the forward link as well.
    let a_stored = store.load(a.id.as_deref().unwrap()).unwrap();
    let b_stored = store.load(b.id.as_deref().unwrap()).unwrap();
    assert_eq!(a_stored.merge_result, product.id);
    assert_eq!(b_stored.merge_result, product.id);

    // The product itself was persisted.
    let product_stored = store.load(product.id.as_deref().unwrap()).unwrap();
    assert!(product_stored.is_merge_result());
}

#[test]
fn generated_accessors_and_predicates_match_record_state() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), None);
    let product = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();

    let executor = MergeExecutor::new(&mut store, &augmentation);
    assert_eq!(
        executor
            .evaluate_reference("getMergeMainReference", &product)
            .unwrap(),
        a.id
    );
    assert_eq!(
        executor
            .evaluate_reference("getMergeSecondReference", &product)
            .unwrap(),
        b.id
    );
    assert_eq!(
        executor.evaluate_reference("getMergeResult", &a).unwrap(),
        product.id
    );
    assert!(executor.evaluate_predicate("isMergeResult", &product).unwrap());
    assert!(!executor.evaluate_predicate("wasMerged", &product).unwrap());
    assert!(executor.evaluate_predicate("wasMerged", &a).unwrap());

    // Predicates are idempotent absent further merges.
    assert!(executor.evaluate_predicate("wasMerged", &a).unwrap());
    assert!(!executor.evaluate_predicate("wasMerged", &product).unwrap());
}

#[test]
fn re_merging_a_source_overwrites_its_forward_link() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), None);
    let mut c = persisted_tweet(&mut store, Some("carol"), None);

    let first = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();
    let second = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut c)
        .unwrap();

    assert_eq!(a.merge_result, second.id);
    assert_ne!(first.id, second.id);
    // The earlier product keeps its own immutable ancestry.
    let first_stored = store.load(first.id.as_deref().unwrap()).unwrap();
    assert_eq!(first_stored.merge_main_reference, a.id);
}

#[test]
fn merge_with_an_empty_mergeable_set_still_links_records() {
    let ty = TypeDescriptor::new("Marker")
        .field(FieldDescriptor::new("id", SemanticType::Scalar("i64".into())).identity());
    let augmentation = augment(&ty).unwrap();
    let mut store = InMemoryStore::new();

    let mut a = Record::new("Marker");
    let mut b = Record::new("Marker");
    store.persist(&mut a).unwrap();
    store.persist(&mut b).unwrap();

    let product = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap();

    assert!(product.values.is_empty());
    assert!(product.is_merge_result());
    assert!(a.was_merged() && b.was_merged());
}

#[test]
fn merge_rejects_an_unpersisted_source() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = Record::new("Tweet");
    let mut b = persisted_tweet(&mut store, Some("bob"), None);

    let err = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap_err();
    assert!(matches!(err, MergeError::UnsavedSource { .. }));
}

#[test]
fn merge_rejects_a_record_of_another_entity() {
    let mut store = InMemoryStore::new();
    let augmentation = augment(&tweet_type()).unwrap();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut other = Record::new("Account");
    store.persist(&mut other).unwrap();

    let err = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut other)
        .unwrap_err();
    assert!(matches!(err, MergeError::EntityMismatch { .. }));
}

#[test]
fn executor_reports_a_hand_written_merge() {
    let ty = tweet_type().declared_member("merge", 1);
    let augmentation = augment(&ty).unwrap();
    let mut store = InMemoryStore::new();

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), None);

    let err = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap_err();
    assert!(matches!(err, MergeError::ReusedMember { .. }));
}

/// Store wrapper that fails the nth save, for partial-failure scenarios.
struct FlakyStore {
    inner: InMemoryStore,
    fail_on_save: usize,
    saves: usize,
}

impl FlakyStore {
    fn failing_on_save(fail_on_save: usize) -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_on_save,
            saves: 0,
        }
    }
}

impl Store for FlakyStore {
    fn persist(&mut self, record: &mut Record) -> Result<String, StoreError> {
        self.inner.persist(record)
    }

    fn save(&mut self, record: &mut Record) -> Result<(), StoreError> {
        self.saves += 1;
        if self.saves == self.fail_on_save {
            return Err(StoreError::Backend {
                message: Cow::Borrowed("injected save failure"),
            });
        }
        self.inner.save(record)
    }

    fn load(&self, id: &str) -> Result<Record, StoreError> {
        self.inner.load(id)
    }
}

#[test]
fn failed_second_save_leaves_a_detectable_partial_state() {
    let augmentation = augment(&tweet_type()).unwrap();
    let mut store = FlakyStore::failing_on_save(2);

    let mut a = persisted_tweet(&mut store, Some("alice"), None);
    let mut b = persisted_tweet(&mut store, Some("bob"), Some("hello"));

    let err = MergeExecutor::new(&mut store, &augmentation)
        .merge(&mut a, &mut b)
        .unwrap_err();
    assert!(matches!(err, MergeError::Store(StoreError::Backend { .. })));

    // The main record was linked and saved before the failure...
    let a_stored = store.load(a.id.as_deref().unwrap()).unwrap();
    assert!(a_stored.was_merged());

    // ...the second record was not.
    let b_stored = store.load(b.id.as_deref().unwrap()).unwrap();
    assert!(!b_stored.was_merged());

    // The product exists and is discoverable from the main record.
    let product_id = a_stored.merge_result.as_deref().unwrap();
    let product = store.load(product_id).unwrap();
    assert!(product.is_merge_result());
    assert_eq!(product.merge_second_reference, b.id);
}

#[test]
fn registry_round_trips_an_augmentation() {
    let augmentation = mergeable::augment_and_register(&tweet_type()).unwrap();
    let fetched = mergeable::get_augmentation("Tweet").expect("registered augmentation");
    assert_eq!(fetched.entity, augmentation.entity);
    assert_eq!(fetched.methods.len(), augmentation.methods.len());
    assert!(mergeable::get_augmentation("Nope").is_none());
}
