//! Persistent entities and their schema descriptors. Child rows carry
//! denormalized author fields so list pages render without joins.

use crate::schema::{ColumnDef, ColumnKind, DefaultPolicy, EntityDescriptor};
use crate::sql::SqlValue;
use crate::store::Record;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Placeholder substituted for the stored password digest before a user is
/// serialized back to clients.
pub const PASSWD_MASK: &str = "******";

pub static USERS: Lazy<EntityDescriptor> = Lazy::new(|| {
    EntityDescriptor::new(
        "users",
        vec![
            ColumnDef::new("id", ColumnKind::Varchar(50))
                .primary()
                .with_default(DefaultPolicy::GeneratedId),
            ColumnDef::new("email", ColumnKind::Varchar(50)),
            ColumnDef::new("passwd", ColumnKind::Varchar(64)),
            ColumnDef::new("admin", ColumnKind::Boolean).with_default(DefaultPolicy::Bool(false)),
            ColumnDef::new("name", ColumnKind::Varchar(50)),
            ColumnDef::new("image", ColumnKind::Varchar(500)),
            ColumnDef::new("created_at", ColumnKind::Double).with_default(DefaultPolicy::Now),
        ],
    )
    .expect("users descriptor")
    .with_unique("email")
    .with_index("created_at")
});

pub static BLOGS: Lazy<EntityDescriptor> = Lazy::new(|| {
    EntityDescriptor::new(
        "blogs",
        vec![
            ColumnDef::new("id", ColumnKind::Varchar(50))
                .primary()
                .with_default(DefaultPolicy::GeneratedId),
            ColumnDef::new("user_id", ColumnKind::Varchar(50)),
            ColumnDef::new("user_name", ColumnKind::Varchar(50)),
            ColumnDef::new("user_image", ColumnKind::Varchar(500)),
            ColumnDef::new("name", ColumnKind::Varchar(50)),
            ColumnDef::new("summary", ColumnKind::Varchar(200)),
            ColumnDef::new("content", ColumnKind::Text),
            ColumnDef::new("created_at", ColumnKind::Double).with_default(DefaultPolicy::Now),
        ],
    )
    .expect("blogs descriptor")
    .with_index("created_at")
});

pub static COMMENTS: Lazy<EntityDescriptor> = Lazy::new(|| {
    EntityDescriptor::new(
        "comments",
        vec![
            ColumnDef::new("id", ColumnKind::Varchar(50))
                .primary()
                .with_default(DefaultPolicy::GeneratedId),
            ColumnDef::new("blog_id", ColumnKind::Varchar(50)),
            ColumnDef::new("user_id", ColumnKind::Varchar(50)),
            ColumnDef::new("user_name", ColumnKind::Varchar(50)),
            ColumnDef::new("user_image", ColumnKind::Varchar(500)),
            ColumnDef::new("content", ColumnKind::Text),
            ColumnDef::new("created_at", ColumnKind::Double).with_default(DefaultPolicy::Now),
        ],
    )
    .expect("comments descriptor")
    .with_index("created_at")
});

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub passwd: String,
    pub admin: bool,
    pub name: String,
    pub image: String,
    pub created_at: f64,
}

impl User {
    /// A new user with id/created_at left unset for the save-time defaults.
    pub fn new(name: &str, email: &str, passwd: &str, image: &str) -> Self {
        User {
            id: String::new(),
            email: email.to_string(),
            passwd: passwd.to_string(),
            admin: false,
            name: name.to_string(),
            image: image.to_string(),
            created_at: 0.0,
        }
    }

    pub fn mask_passwd(&mut self) {
        self.passwd = PASSWD_MASK.to_string();
    }
}

impl Record for User {
    fn descriptor() -> &'static EntityDescriptor {
        &USERS
    }

    fn value_of(&self, column: &str) -> SqlValue {
        match column {
            "id" => SqlValue::Text(self.id.clone()),
            "email" => SqlValue::Text(self.email.clone()),
            "passwd" => SqlValue::Text(self.passwd.clone()),
            "admin" => SqlValue::Bool(self.admin),
            "name" => SqlValue::Text(self.name.clone()),
            "image" => SqlValue::Text(self.image.clone()),
            "created_at" => SqlValue::Double(self.created_at),
            _ => SqlValue::Null,
        }
    }

    fn is_unset(&self, column: &str) -> bool {
        match column {
            "id" => self.id.is_empty(),
            "created_at" => self.created_at == 0.0,
            _ => false,
        }
    }

    fn assign(&mut self, column: &str, value: SqlValue) {
        match (column, value) {
            ("id", SqlValue::Text(v)) => self.id = v,
            ("created_at", SqlValue::Double(v)) => self.created_at = v,
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Blog {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub name: String,
    pub summary: String,
    pub content: String,
    pub created_at: f64,
}

impl Blog {
    pub fn new(author: &User, name: &str, summary: &str, content: &str) -> Self {
        Blog {
            id: String::new(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            name: name.to_string(),
            summary: summary.to_string(),
            content: content.to_string(),
            created_at: 0.0,
        }
    }
}

impl Record for Blog {
    fn descriptor() -> &'static EntityDescriptor {
        &BLOGS
    }

    fn value_of(&self, column: &str) -> SqlValue {
        match column {
            "id" => SqlValue::Text(self.id.clone()),
            "user_id" => SqlValue::Text(self.user_id.clone()),
            "user_name" => SqlValue::Text(self.user_name.clone()),
            "user_image" => SqlValue::Text(self.user_image.clone()),
            "name" => SqlValue::Text(self.name.clone()),
            "summary" => SqlValue::Text(self.summary.clone()),
            "content" => SqlValue::Text(self.content.clone()),
            "created_at" => SqlValue::Double(self.created_at),
            _ => SqlValue::Null,
        }
    }

    fn is_unset(&self, column: &str) -> bool {
        match column {
            "id" => self.id.is_empty(),
            "created_at" => self.created_at == 0.0,
            _ => false,
        }
    }

    fn assign(&mut self, column: &str, value: SqlValue) {
        match (column, value) {
            ("id", SqlValue::Text(v)) => self.id = v,
            ("created_at", SqlValue::Double(v)) => self.created_at = v,
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub blog_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub content: String,
    pub created_at: f64,
}

impl Comment {
    pub fn new(blog_id: &str, author: &User, content: &str) -> Self {
        Comment {
            id: String::new(),
            blog_id: blog_id.to_string(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            content: content.to_string(),
            created_at: 0.0,
        }
    }
}

impl Record for Comment {
    fn descriptor() -> &'static EntityDescriptor {
        &COMMENTS
    }

    fn value_of(&self, column: &str) -> SqlValue {
        match column {
            "id" => SqlValue::Text(self.id.clone()),
            "blog_id" => SqlValue::Text(self.blog_id.clone()),
            "user_id" => SqlValue::Text(self.user_id.clone()),
            "user_name" => SqlValue::Text(self.user_name.clone()),
            "user_image" => SqlValue::Text(self.user_image.clone()),
            "content" => SqlValue::Text(self.content.clone()),
            "created_at" => SqlValue::Double(self.created_at),
            _ => SqlValue::Null,
        }
    }

    fn is_unset(&self, column: &str) -> bool {
        match column {
            "id" => self.id.is_empty(),
            "created_at" => self.created_at == 0.0,
            _ => false,
        }
    }

    fn assign(&mut self, column: &str, value: SqlValue) {
        match (column, value) {
            ("id", SqlValue::Text(v)) => self.id = v,
            ("created_at", SqlValue::Double(v)) => self.created_at = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::apply_defaults;

    #[test]
    fn save_defaults_fill_unset_columns() {
        let mut user = User::new("Alice", "alice@example.com", "digest", "about:blank");
        assert!(user.is_unset("id"));
        assert!(user.is_unset("created_at"));
        apply_defaults(&mut user);
        assert_eq!(user.id.len(), 50);
        assert!(user.created_at > 1_500_000_000.0);
    }

    #[test]
    fn save_defaults_keep_assigned_values() {
        let mut blog = Blog::new(
            &User::new("Alice", "alice@example.com", "digest", "about:blank"),
            "Title",
            "Summary",
            "Body",
        );
        blog.id = "preassigned".into();
        blog.created_at = 42.0;
        apply_defaults(&mut blog);
        assert_eq!(blog.id, "preassigned");
        assert_eq!(blog.created_at, 42.0);
    }

    #[test]
    fn insert_bind_order_matches_descriptor() {
        let cols: Vec<&str> = USERS.insert_columns().collect();
        assert_eq!(
            cols,
            vec!["email", "passwd", "admin", "name", "image", "created_at", "id"]
        );
    }

    #[test]
    fn comment_copies_author_fields() {
        let mut author = User::new("Bob", "bob@example.com", "digest", "img");
        author.id = "u1".into();
        let c = Comment::new("b1", &author, "hello");
        assert_eq!(c.blog_id, "b1");
        assert_eq!(c.user_id, "u1");
        assert_eq!(c.user_name, "Bob");
        assert_eq!(c.user_image, "img");
    }
}
