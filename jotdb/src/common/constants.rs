// record constants
pub const FIELD_ID: &str = "id";
pub const FIELD_CREATED_AT: &str = "created_at";
pub const FIELD_UPDATED_AT: &str = "updated_at";
pub const RESERVED_FIELDS: [&str; 3] = [FIELD_ID, FIELD_CREATED_AT, FIELD_UPDATED_AT];

// Compile-time assertion for reserved fields count
const _: () = {
    const RESERVED_FIELDS_COUNT: usize = 3;
    const ACTUAL_COUNT: usize = RESERVED_FIELDS.len();
    const _: [(); 1] = [(); (ACTUAL_COUNT == RESERVED_FIELDS_COUNT) as usize];
};

// well-known collection names
pub const USERS_COLLECTION: &str = "users";
pub const POSTS_COLLECTION: &str = "posts";
pub const COMMENTS_COLLECTION: &str = "comments";
pub const FOLLOWS_COLLECTION: &str = "follows";
pub const LIKES_COLLECTION: &str = "likes";
pub const BANNED_IPS_COLLECTION: &str = "banned_ips";
pub const RECOVERY_CODES_COLLECTION: &str = "recovery_codes";
pub const TRACKING_COLLECTION: &str = "tracking";

// post field constants
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_TRIGGER_QUESTIONS: &str = "trigger_questions";
pub const FIELD_IS_ACTIVE: &str = "is_active";
pub const FIELD_LIKE_COUNT: &str = "like_count";
pub const FIELD_COMMENT_COUNT: &str = "comment_count";
pub const FIELD_DOWNLOAD_COUNT: &str = "download_count";
pub const FIELD_MEDIA_TYPE: &str = "media_type";
pub const FIELD_MEDIA_PATH: &str = "media_path";
pub const FIELD_THUMBNAIL_PATH: &str = "thumbnail_path";

// interaction field constants
pub const FIELD_POST_ID: &str = "post_id";

// user field constants
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_DISPLAY_NAME: &str = "display_name";
pub const FIELD_PROFILE_IMAGE: &str = "profile_image";
pub const FIELD_FOLLOWER_COUNT: &str = "follower_count";
pub const FIELD_FOLLOWING_COUNT: &str = "following_count";

// search/ranking field constants
pub const FIELD_RELEVANCE_SCORE: &str = "relevance_score";
pub const FIELD_ENGAGEMENT_SCORE: &str = "engagement_score";

// pagination constants
pub const POSTS_PER_PAGE: usize = 20;
pub const COMMENTS_PER_PAGE: usize = 10;
pub const SEARCH_RESULTS_LIMIT: usize = 50;

// persistence constants
pub const COLLECTION_FILE_EXT: &str = "json";
pub const TEMP_FILE_SUFFIX: &str = ".tmp";
// Microsecond precision keeps `updated_at` strictly increasing across
// back-to-back updates; lexicographic order matches chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub const JOTDB_VERSION: &str = env!("CARGO_PKG_VERSION");
