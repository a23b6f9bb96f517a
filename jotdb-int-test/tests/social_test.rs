use jotdb::collection::RecordId;
use jotdb::common::Value;
use jotdb::db::JotDb;
use jotdb::errors::{ErrorKind, JotResult};
use jotdb::social::{Admin, Interactions, Media, Posts};
use jotdb_int_test::test_util::{cleanup, create_test_context, create_user, run_test};
use std::fs;

#[ctor::ctor]
fn init() {
    colog::init();
}

fn seed_post(db: &JotDb, author: &RecordId, title: &str) -> JotResult<RecordId> {
    Posts::new(db).create(author, title, "content", vec![], None)
}

#[test]
fn test_create_post_seeds_counters() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "alice", "Alice")?;
            let posts = Posts::new(&db);

            let id = posts.create(
                &author,
                "  first post  ",
                "hello",
                vec!["what is this".to_string()],
                None,
            )?;

            let post = posts.get(&id)?.expect("post exists and is active");
            assert_eq!(post.get("title"), Value::from("first post"));
            assert_eq!(post.get("like_count").as_i64(), Some(0));
            assert_eq!(post.get("comment_count").as_i64(), Some(0));
            assert_eq!(post.get("download_count").as_i64(), Some(0));
            assert_eq!(post.get("is_active"), Value::Bool(true));
            assert_eq!(post.get("username"), Value::from("alice"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_post_requires_title() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "bob", "Bob")?;
            let result = Posts::new(&db).create(&author, "   ", "body", vec![], None);
            assert!(result.is_err());
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_soft_deleted_post_is_hidden_but_on_disk() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "carol", "Carol")?;
            let posts = Posts::new(&db);
            let id = seed_post(&db, &author, "soon gone")?;

            assert!(posts.soft_delete(&id)?);
            assert!(posts.get(&id)?.is_none());

            // the record itself is still stored
            let raw = db.collection("posts")?.get_by_id(&id)?;
            assert!(raw.is_some());
            assert_eq!(raw.unwrap().get("is_active"), Value::Bool(false));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_feed_is_newest_first_and_paginated() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "dave", "Dave")?;
            let posts = Posts::new(&db);

            let mut ids = Vec::new();
            for n in 0..25 {
                ids.push(seed_post(&db, &author, &format!("post {}", n))?);
            }
            let hidden = seed_post(&db, &author, "hidden")?;
            posts.soft_delete(&hidden)?;

            let page1 = posts.feed(1)?;
            assert_eq!(page1.total, 25);
            assert_eq!(page1.pages, 2);
            assert_eq!(page1.posts.len(), 20);
            // newest first
            assert_eq!(page1.posts[0].id()?, *ids.last().unwrap());

            let page2 = posts.feed(2)?;
            assert_eq!(page2.posts.len(), 5);
            assert_eq!(page2.posts.last().unwrap().id()?, ids[0]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_user_posts_only_lists_that_user() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let alice = create_user(&db, "alice", "Alice")?;
            let bob = create_user(&db, "bob", "Bob")?;
            let posts = Posts::new(&db);

            seed_post(&db, &alice, "alice 1")?;
            seed_post(&db, &bob, "bob 1")?;
            seed_post(&db, &alice, "alice 2")?;

            let page = posts.user_posts(&alice, 1)?;
            assert_eq!(page.total, 2);
            for post in &page.posts {
                assert_eq!(post.get("user_id"), Value::from(alice.as_str()));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_like_toggle_adjusts_counter() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "erin", "Erin")?;
            let fan = create_user(&db, "frank", "Frank")?;
            let posts = Posts::new(&db);
            let interactions = Interactions::new(&db);
            let post = seed_post(&db, &author, "likeable")?;

            assert!(interactions.toggle_like(&fan, &post)?);
            assert!(interactions.is_liked(&fan, &post)?);
            let liked = posts.get(&post)?.unwrap();
            assert_eq!(liked.get("like_count").as_i64(), Some(1));

            assert!(!interactions.toggle_like(&fan, &post)?);
            assert!(!interactions.is_liked(&fan, &post)?);
            let unliked = posts.get(&post)?.unwrap();
            assert_eq!(unliked.get("like_count").as_i64(), Some(0));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_like_counter_never_goes_negative() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "gina", "Gina")?;
            let posts = Posts::new(&db);
            let post = seed_post(&db, &author, "floor test")?;

            posts.decrement_like_count(&post)?;
            posts.decrement_like_count(&post)?;
            let record = posts.get(&post)?.unwrap();
            assert_eq!(record.get("like_count").as_i64(), Some(0));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_comments_lifecycle() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "hugo", "Hugo")?;
            let reader = create_user(&db, "iris", "Iris")?;
            let posts = Posts::new(&db);
            let interactions = Interactions::new(&db);
            let post = seed_post(&db, &author, "discussable")?;

            let blank = interactions.add_comment(&reader, &post, "   ");
            assert_eq!(blank.unwrap_err().kind(), &ErrorKind::ValidationError);

            let first = interactions.add_comment(&reader, &post, "first!")?;
            interactions.add_comment(&author, &post, "thanks")?;

            let record = posts.get(&post)?.unwrap();
            assert_eq!(record.get("comment_count").as_i64(), Some(2));

            let page = interactions.post_comments(&post, 1)?;
            assert_eq!(page.total, 2);
            // oldest first, author-joined
            assert_eq!(page.comments[0].get("content"), Value::from("first!"));
            assert_eq!(page.comments[0].get("username"), Value::from("iris"));

            assert!(interactions.delete_comment(&first)?);
            let record = posts.get(&post)?.unwrap();
            assert_eq!(record.get("comment_count").as_i64(), Some(1));
            assert!(!interactions.delete_comment(&first)?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_comment_on_missing_post_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let user = create_user(&db, "jack", "Jack")?;
            let ghost = RecordId::parse("deadbeef00")?;
            let result = Interactions::new(&db).add_comment(&user, &ghost, "hello?");
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::NotFound);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_follow_toggle_updates_both_counters() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let alice = create_user(&db, "alice", "Alice")?;
            let bob = create_user(&db, "bob", "Bob")?;
            let interactions = Interactions::new(&db);
            let users = db.collection("users")?;

            assert!(interactions.toggle_follow(&alice, &bob)?);
            assert!(interactions.is_following(&alice, &bob)?);
            // follow is one-directional
            assert!(!interactions.is_following(&bob, &alice)?);

            let alice_rec = users.get_by_id(&alice)?.unwrap();
            let bob_rec = users.get_by_id(&bob)?.unwrap();
            assert_eq!(alice_rec.get("following_count").as_i64(), Some(1));
            assert_eq!(bob_rec.get("follower_count").as_i64(), Some(1));

            assert!(!interactions.toggle_follow(&alice, &bob)?);
            let alice_rec = users.get_by_id(&alice)?.unwrap();
            let bob_rec = users.get_by_id(&bob)?.unwrap();
            assert_eq!(alice_rec.get("following_count").as_i64(), Some(0));
            assert_eq!(bob_rec.get("follower_count").as_i64(), Some(0));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_self_follow_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let alice = create_user(&db, "alice", "Alice")?;
            let result = Interactions::new(&db).toggle_follow(&alice, &alice);
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_trending_ranks_by_engagement() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "kate", "Kate")?;
            let posts = Posts::new(&db);

            let quiet = seed_post(&db, &author, "quiet")?;
            let liked = seed_post(&db, &author, "liked")?;
            let discussed = seed_post(&db, &author, "discussed")?;

            for _ in 0..3 {
                posts.increment_like_count(&liked)?;
            }
            // 2 comments outweigh 3 likes
            posts.increment_comment_count(&discussed)?;
            posts.increment_comment_count(&discussed)?;

            let trending = posts.trending(2)?;
            assert_eq!(trending.len(), 2);
            assert_eq!(trending[0].id()?, discussed);
            assert_eq!(trending[0].get("engagement_score").as_i64(), Some(4));
            assert_eq!(trending[1].id()?, liked);
            assert!(trending.iter().all(|p| p.id().unwrap() != quiet));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_purge_post_removes_dependents_and_media() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "liam", "Liam")?;
            let fan = create_user(&db, "mona", "Mona")?;
            let posts = Posts::new(&db);
            let interactions = Interactions::new(&db);
            let admin = Admin::new(&db);

            let media_path = ctx.path().join("upload.mp4");
            let thumb_path = ctx.path().join("upload-thumb.jpg");
            fs::write(&media_path, b"video bytes").expect("media file written");
            fs::write(&thumb_path, b"thumb bytes").expect("thumb file written");

            let post = posts.create(
                &author,
                "with media",
                "watch this",
                vec![],
                Some(Media {
                    media_type: "video".to_string(),
                    media_path: media_path.to_string_lossy().into_owned(),
                    thumbnail_path: Some(thumb_path.to_string_lossy().into_owned()),
                }),
            )?;
            interactions.toggle_like(&fan, &post)?;
            interactions.add_comment(&fan, &post, "nice")?;

            assert!(admin.purge_post(&post)?);

            assert!(db.collection("posts")?.get_by_id(&post)?.is_none());
            assert_eq!(db.collection("likes")?.count(None)?, 0);
            assert_eq!(db.collection("comments")?.count(None)?, 0);
            assert!(!media_path.exists());
            assert!(!thumb_path.exists());

            assert!(!admin.purge_post(&post)?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_ban_and_unban_ip() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let admin = Admin::new(&db);

            assert!(!admin.is_banned("203.0.113.7")?);
            admin.ban_ip("203.0.113.7", "spam")?;
            assert!(admin.is_banned("203.0.113.7")?);

            // re-banning updates in place instead of duplicating
            admin.ban_ip("203.0.113.7", "more spam")?;
            assert_eq!(db.collection("banned_ips")?.count(None)?, 1);

            assert!(admin.unban_ip("203.0.113.7")?);
            assert!(!admin.is_banned("203.0.113.7")?);
            assert!(!admin.unban_ip("203.0.113.7")?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_backup_all_copies_every_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let author = create_user(&db, "nina", "Nina")?;
            seed_post(&db, &author, "archived")?;

            let backup_dir = ctx.path().join("backups");
            let copies = Admin::new(&db).backup_all(&backup_dir)?;

            // users and posts at minimum
            assert!(copies.len() >= 2);
            for copy in &copies {
                assert!(copy.exists());
                assert!(copy.starts_with(&backup_dir));
            }
            Ok(())
        },
        cleanup,
    )
}
