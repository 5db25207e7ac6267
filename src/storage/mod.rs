//! Document-store access: one pooled `Database` handle with the entity
//! operations split across sibling modules, mirroring the collections
//! (users, articles, categories, newsletter subscribers).

mod articles;
mod categories;
mod newsletter;
mod reading_history;
mod schema;
mod types;
mod users;

pub use schema::Database;
pub use types::{
    Article, ArticleStatus, Author, Bilingual, CategoryRef, NewArticle, NewUser, ProfileUpdate,
    RecentArticle, RecentlyReadEntry, RecentlyReadItem, StorageError, User,
};

/// Maximum number of entries kept in a user's recently-read list.
pub const RECENTLY_READ_CAP: usize = 20;
