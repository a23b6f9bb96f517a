use crate::collection::RecordId;
use crate::common::{
    Value, BANNED_IPS_COLLECTION, COMMENTS_COLLECTION, FIELD_MEDIA_PATH, FIELD_THUMBNAIL_PATH,
    LIKES_COLLECTION, POSTS_COLLECTION,
};
use crate::db::JotDb;
use crate::errors::{ErrorKind, JotError, JotResult};
use crate::{doc, pred};
use std::fs;
use std::path::{Path, PathBuf};

/// Moderation operations: hard deletes, IP bans, and backups.
///
/// This is the only facade that removes data from disk. Regular deletion
/// goes through [Posts::soft_delete](crate::social::Posts::soft_delete).
#[derive(Clone)]
pub struct Admin {
    db: JotDb,
}

impl Admin {
    pub fn new(db: &JotDb) -> Self {
        Admin { db: db.clone() }
    }

    /// Permanently removes a post together with everything that hangs off it:
    /// its likes, its comments, and any media files it references. Returns
    /// `Ok(false)` if no such post exists.
    ///
    /// Media files that cannot be removed are logged and skipped; the record
    /// cleanup still completes.
    pub fn purge_post(&self, post_id: &RecordId) -> JotResult<bool> {
        let posts = self.db.collection(POSTS_COLLECTION)?;
        let post = match posts.get_by_id(post_id)? {
            Some(post) => post,
            None => return Ok(false),
        };

        let likes = self.db.collection(LIKES_COLLECTION)?;
        for id in likes
            .find(&pred! { post_id: (post_id.as_str()) })?
            .into_keys()
        {
            likes.delete(&id)?;
        }

        let comments = self.db.collection(COMMENTS_COLLECTION)?;
        for id in comments
            .find(&pred! { post_id: (post_id.as_str()) })?
            .into_keys()
        {
            comments.delete(&id)?;
        }

        for field in [FIELD_MEDIA_PATH, FIELD_THUMBNAIL_PATH] {
            if let Value::String(path) = post.get(field) {
                remove_media_file(Path::new(&path));
            }
        }

        posts.delete(post_id)?;
        log::info!("Purged post {} with its likes, comments, and media", post_id);
        Ok(true)
    }

    /// Bans an IP address. Banning an already banned address updates its
    /// reason. Returns the id of the ban record.
    pub fn ban_ip(&self, ip: &str, reason: &str) -> JotResult<RecordId> {
        let ip = ip.trim();
        if ip.is_empty() {
            log::error!("Rejected ban: IP address is required");
            return Err(JotError::new(
                "IP address is required",
                ErrorKind::ValidationError,
            ));
        }

        let banned_ips = self.db.collection(BANNED_IPS_COLLECTION)?;
        if let Some(existing) = banned_ips.find_one(&pred! { ip: ip })? {
            let id = existing.id()?;
            banned_ips.update(&id, &doc! { reason: reason })?;
            return Ok(id);
        }

        banned_ips.insert(doc! { ip: ip, reason: reason })
    }

    /// Lifts the ban on an IP address. Returns `Ok(false)` if it was not
    /// banned.
    pub fn unban_ip(&self, ip: &str) -> JotResult<bool> {
        let banned_ips = self.db.collection(BANNED_IPS_COLLECTION)?;
        match banned_ips.find_one(&pred! { ip: (ip.trim()) })? {
            Some(ban) => banned_ips.delete(&ban.id()?),
            None => Ok(false),
        }
    }

    /// Returns whether an IP address is currently banned.
    pub fn is_banned(&self, ip: &str) -> JotResult<bool> {
        let banned_ips = self.db.collection(BANNED_IPS_COLLECTION)?;
        Ok(banned_ips.find_one(&pred! { ip: (ip.trim()) })?.is_some())
    }

    /// Backs up every collection in the data directory into `dest_dir` and
    /// returns the paths of the copies.
    pub fn backup_all(&self, dest_dir: &Path) -> JotResult<Vec<PathBuf>> {
        let mut copies = Vec::new();
        for name in self.db.collection_names()? {
            let collection = self.db.collection(&name)?;
            copies.push(collection.backup(dest_dir)?);
        }
        log::info!("Backed up {} collections to {:?}", copies.len(), dest_dir);
        Ok(copies)
    }
}

fn remove_media_file(path: &Path) {
    if path.as_os_str().is_empty() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed media file {:?}", path),
        Err(err) => log::warn!("Failed to remove media file {:?}: {}", path, err),
    }
}
