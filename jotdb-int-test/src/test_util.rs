use jotdb::collection::RecordId;
use jotdb::db::JotDb;
use jotdb::doc;
use jotdb::errors::JotResult;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, thread};

/// Runs a test with guaranteed cleanup.
/// The cleanup closure runs whether the test body passes, fails, or panics.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> JotResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> JotResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> JotResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let ctx = before().expect("Before run failed");

    // the database handle holds locks, which are not RefUnwindSafe; cleanup
    // below runs either way, so crossing the unwind boundary is fine
    let test_ctx = ctx.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| test(test_ctx)));

    if let Err(e) = after(ctx) {
        eprintln!("Warning: cleanup failed: {:?}", e);
    }

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(panic_err) => std::panic::resume_unwind(panic_err),
    }
}

#[derive(Clone)]
pub struct TestContext {
    path: PathBuf,
    db: JotDb,
}

impl TestContext {
    pub fn new(path: PathBuf, db: JotDb) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn db(&self) -> JotDb {
        self.db.clone()
    }
}

pub fn random_path() -> PathBuf {
    env::temp_dir().join(format!("jotdb-int-test-{:016x}", rand::random::<u64>()))
}

pub fn create_test_context() -> JotResult<TestContext> {
    let path = random_path();
    let db = JotDb::builder().base_dir(&path).open_or_create()?;
    Ok(TestContext::new(path, db))
}

/// A context with `single_writer` disabled, so reads reload from disk.
pub fn create_multi_writer_test_context() -> JotResult<TestContext> {
    let path = random_path();
    let db = JotDb::builder()
        .base_dir(&path)
        .single_writer(false)
        .open_or_create()?;
    Ok(TestContext::new(path, db))
}

pub fn cleanup(ctx: TestContext) -> JotResult<()> {
    let path = ctx.path().to_path_buf();
    let max_retries = 5;

    for retry in 0..max_retries {
        if !path.exists() {
            return Ok(());
        }
        match fs::remove_dir_all(&path) {
            Ok(_) => return Ok(()),
            Err(_) if retry < max_retries - 1 => {
                thread::sleep(Duration::from_millis(50 * (retry as u64 + 1)));
            }
            Err(e) => {
                eprintln!(
                    "Warning: Failed to remove test directory {:?} after {} attempts: {:?}",
                    path, max_retries, e
                );
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Inserts a user record and returns its id.
pub fn create_user(db: &JotDb, username: &str, display_name: &str) -> JotResult<RecordId> {
    db.collection("users")?.insert(doc! {
        username: username,
        display_name: display_name,
        profile_image: (format!("/img/{}.png", username)),
        follower_count: 0,
        following_count: 0,
    })
}
