use jotdb::common::Value;
use jotdb::errors::ErrorKind;
use jotdb::{doc, pred};
use jotdb_int_test::test_util::{cleanup, create_test_context, run_test};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_collection_name_and_file() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            assert_eq!(collection.name(), "posts");
            assert_eq!(
                collection.path(),
                ctx.path().join("posts.json").as_path()
            );
            assert!(collection.path().exists());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_assigns_unique_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let first = collection.insert(doc! { title: "one" })?;
            let second = collection.insert(doc! { title: "two" })?;
            assert_ne!(first, second);
            assert_eq!(collection.count(None)?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_by_id_roundtrip() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let id = collection.insert(doc! {
                title: "how to cook",
                like_count: 3,
                is_active: true,
            })?;

            let found = collection.get_by_id(&id)?.expect("record should exist");
            assert_eq!(found.get("title"), Value::from("how to cook"));
            assert_eq!(found.get("like_count").as_i64(), Some(3));
            assert_eq!(found.get("is_active"), Value::Bool(true));
            assert_eq!(found.id()?, id);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_preserves_position_and_created_at() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let first = collection.insert(doc! { title: "a" })?;
            let second = collection.insert(doc! { title: "b" })?;

            let before = collection.get_by_id(&first)?.unwrap();
            assert!(collection.update(&first, &doc! { title: "a2" })?);
            let after = collection.get_by_id(&first)?.unwrap();

            assert_eq!(after.created_at(), before.created_at());
            assert!(after.updated_at() > before.updated_at());

            // updated record keeps its place in insertion order
            let all: Vec<_> = collection.get_all()?.into_keys().collect();
            assert_eq!(all, vec![first, second]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_then_find() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let keep = collection.insert(doc! { title: "keep", tag: "x" })?;
            let gone = collection.insert(doc! { title: "gone", tag: "x" })?;

            assert!(collection.delete(&gone)?);
            let found = collection.find(&pred! { tag: "x" })?;
            assert_eq!(found.len(), 1);
            assert!(found.contains_key(&keep));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_loose_equality() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            collection.insert(doc! { like_count: 42 })?;
            collection.insert(doc! { like_count: "42" })?;
            collection.insert(doc! { like_count: 7 })?;

            assert_eq!(collection.count(Some(&pred! { like_count: 42 }))?, 2);
            assert_eq!(collection.count(Some(&pred! { like_count: "42" }))?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one_returns_first_match() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let first = collection.insert(doc! { tag: "x", n: 1 })?;
            collection.insert(doc! { tag: "x", n: 2 })?;

            let found = collection.find_one(&pred! { tag: "x" })?.unwrap();
            assert_eq!(found.id()?, first);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_with_id_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let id = collection.insert(doc! { title: "original" })?;
            let existing = collection.get_by_id(&id)?.unwrap();

            // a fetched document still carries its id, so re-inserting it
            // must be refused
            let result = collection.insert(existing);
            assert!(result.is_err());
            assert_eq!(
                result.unwrap_err().kind(),
                &ErrorKind::InvalidOperation
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_predicate_surfaces_error() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let bad = jotdb::query::Predicate::new().field("", "x");
            let result = collection.find(&bad);
            assert!(result.is_err());
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_collection_cached_per_name() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let a = db.collection("posts")?;
            let b = db.collection("posts")?;
            a.insert(doc! { title: "seen by both" })?;
            assert_eq!(b.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}
