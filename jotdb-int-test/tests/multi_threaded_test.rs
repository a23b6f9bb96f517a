use jotdb::doc;
use jotdb_int_test::test_util::{cleanup, create_test_context, run_test};
use std::collections::HashSet;
use std::thread;

#[ctor::ctor]
fn init() {
    colog::init();
}

const THREADS: usize = 8;
const INSERTS_PER_THREAD: usize = 25;

#[test]
fn test_concurrent_inserts_are_all_stored() {
    run_test(
        create_test_context,
        |ctx| {
            let mut handles = Vec::new();
            for t in 0..THREADS {
                let db = ctx.db();
                handles.push(thread::spawn(move || {
                    let collection = db.collection("posts").expect("collection opens");
                    let mut ids = Vec::new();
                    for n in 0..INSERTS_PER_THREAD {
                        let id = collection
                            .insert(doc! { thread: t, n: n })
                            .expect("insert succeeds");
                        ids.push(id);
                    }
                    ids
                }));
            }

            let mut all_ids = HashSet::new();
            for handle in handles {
                for id in handle.join().expect("thread completes") {
                    assert!(all_ids.insert(id), "record ids must be unique");
                }
            }

            let collection = ctx.db().collection("posts")?;
            assert_eq!(collection.count(None)?, THREADS * INSERTS_PER_THREAD);

            // every id handed out is resolvable
            for id in &all_ids {
                assert!(collection.get_by_id(id)?.is_some());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_updates_against_one_record() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            let id = collection.insert(doc! { title: "contended" })?;

            let mut handles = Vec::new();
            for t in 0..THREADS {
                let db = ctx.db();
                let id = id.clone();
                handles.push(thread::spawn(move || {
                    let collection = db.collection("posts").expect("collection opens");
                    for _ in 0..10 {
                        collection
                            .update(&id, &doc! { last_writer: t })
                            .expect("update succeeds");
                    }
                }));
            }
            for handle in handles {
                handle.join().expect("thread completes");
            }

            let record = collection.get_by_id(&id)?.expect("record still present");
            let last_writer = record.get("last_writer").as_i64().expect("field written");
            assert!((0..THREADS as i64).contains(&last_writer));
            assert_eq!(collection.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_readers_run_alongside_writers() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("posts")?;
            collection.insert(doc! { seed: true })?;

            let writer_db = ctx.db();
            let writer = thread::spawn(move || {
                let collection = writer_db.collection("posts").expect("collection opens");
                for n in 0..50 {
                    collection.insert(doc! { n: n }).expect("insert succeeds");
                }
            });

            let reader_db = ctx.db();
            let reader = thread::spawn(move || {
                let collection = reader_db.collection("posts").expect("collection opens");
                for _ in 0..50 {
                    // snapshots must always be internally consistent
                    let all = collection.get_all().expect("read succeeds");
                    for (id, doc) in &all {
                        assert_eq!(&doc.id().expect("stored id is valid"), id);
                    }
                }
            });

            writer.join().expect("writer completes");
            reader.join().expect("reader completes");
            assert_eq!(collection.count(None)?, 51);
            Ok(())
        },
        cleanup,
    )
}
