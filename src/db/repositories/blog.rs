//! Blog repository
//!
//! Database operations for blogs and their tag associations. Writes that
//! touch `blog_tags` run in the same transaction as the blog row.

use crate::db::update::{ApplyUpdate, UpdateBuilder};
use crate::db::DynDatabasePool;
use crate::models::{Blog, BlogChanges, BlogFilter, BlogStatus, NewBlog, TagRef};
use crate::utils::{ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;

use super::{new_id, with_pool, DecodeRow};

const BLOG_SELECT: &str = r#"
    SELECT b.id, b.title, b.slug, b.content, b.excerpt, b.featured_image, b.category_id,
           c.name AS category_name, c.slug AS category_slug,
           b.status, b.author_id, u.name AS author_name, u.email AS author_email,
           b.published_at, b.created_at, b.updated_at
    FROM blogs b
    LEFT JOIN categories c ON c.id = b.category_id
    LEFT JOIN users u ON u.id = b.author_id
"#;

const TAGS_FOR_BLOG: &str = r#"
    SELECT t.id, t.name, t.slug
    FROM tags t
    JOIN blog_tags bt ON bt.tag_id = t.id
    WHERE bt.blog_id = ?
    ORDER BY t.name ASC
"#;

const INSERT_BLOG_TAG: &str = "INSERT INTO blog_tags (blog_id, tag_id) VALUES (?, ?)";

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// List one page of blogs, newest first, with tags attached
    async fn list(&self, filter: &BlogFilter, params: &ListParams) -> Result<PagedResult<Blog>>;

    /// Get blog by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Blog>>;

    /// Get blog by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>>;

    /// Insert a blog and its tag associations
    async fn create(&self, blog: &NewBlog) -> Result<Blog>;

    /// Apply a partial update, replacing tags when supplied.
    /// Returns false when the blog does not exist.
    async fn update(&self, id: &str, changes: &BlogChanges) -> Result<bool>;

    /// Delete a blog with its tag associations. Returns false when missing.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based blog repository implementation
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }

    async fn tags_for(&self, blog_id: &str) -> Result<Vec<TagRef>> {
        with_pool!(self.pool, |pool| {
            sqlx::query(TAGS_FOR_BLOG)
                .bind(blog_id)
                .fetch_all(pool)
                .await
                .context("Failed to load blog tags")?
                .iter()
                .map(row_to_tag_ref)
                .collect()
        })
    }

    async fn with_tags(&self, blog: Option<Blog>) -> Result<Option<Blog>> {
        match blog {
            Some(mut blog) => {
                blog.tags = self.tags_for(&blog.id).await?;
                Ok(Some(blog))
            }
            None => Ok(None),
        }
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<Blog>> {
        let sql = format!("{} WHERE b.{} = ?", BLOG_SELECT, column);
        let blog = with_pool!(self.pool, |pool| {
            sqlx::query(&sql)
                .bind(value)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("Failed to get blog by {}", column))?
                .map(|row| row_to_blog(&row))
                .transpose()?
        });
        self.with_tags(blog).await
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn list(&self, filter: &BlogFilter, params: &ListParams) -> Result<PagedResult<Blog>> {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();
        if let Some(status) = filter.status {
            conditions.push("b.status = ?");
            binds.push(status.as_str().to_string());
        }
        if let Some(category) = &filter.category_slug {
            conditions.push("c.slug = ?");
            binds.push(category.clone());
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM blogs b LEFT JOIN categories c ON c.id = b.category_id{}",
            where_clause
        );
        let page_sql = format!(
            "{}{} ORDER BY b.created_at DESC LIMIT ? OFFSET ?",
            BLOG_SELECT, where_clause
        );

        let (total, mut blogs) = with_pool!(self.pool, |pool| {
            let mut count = sqlx::query(&count_sql);
            for value in &binds {
                count = count.bind(value);
            }
            let total = count
                .fetch_one(pool)
                .await
                .context("Failed to count blogs")?
                .int("total")?;

            let mut page = sqlx::query(&page_sql);
            for value in &binds {
                page = page.bind(value);
            }
            let blogs = page
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(pool)
                .await
                .context("Failed to list blogs")?
                .iter()
                .map(row_to_blog)
                .collect::<Result<Vec<_>>>()?;

            (total, blogs)
        });

        for blog in &mut blogs {
            blog.tags = self.tags_for(&blog.id).await?;
        }

        Ok(PagedResult::new(blogs, total, *params))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Blog>> {
        self.fetch_one_by("id", id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>> {
        self.fetch_one_by("slug", slug).await
    }

    async fn create(&self, blog: &NewBlog) -> Result<Blog> {
        let id = new_id();
        let now = Utc::now();
        let tag_ids = distinct(&blog.tag_ids);

        with_pool!(self.pool, |pool| {
            let mut tx = pool.begin().await.context("Failed to begin transaction")?;

            sqlx::query(
                r#"
                INSERT INTO blogs (id, title, slug, content, excerpt, featured_image, category_id,
                                   author_id, status, published_at, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&blog.title)
            .bind(&blog.slug)
            .bind(&blog.content)
            .bind(&blog.excerpt)
            .bind(&blog.featured_image)
            .bind(&blog.category_id)
            .bind(&blog.author_id)
            .bind(blog.status.as_str())
            .bind(blog.published_at)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("Failed to create blog")?;

            for tag_id in &tag_ids {
                sqlx::query(INSERT_BLOG_TAG)
                    .bind(&id)
                    .bind(tag_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to attach tag to blog")?;
            }

            tx.commit().await.context("Failed to commit blog")?;
        });

        self.get_by_id(&id)
            .await?
            .context("Created blog could not be reloaded")
    }

    async fn update(&self, id: &str, changes: &BlogChanges) -> Result<bool> {
        let mut builder = UpdateBuilder::new("blogs");
        if let Some(title) = &changes.title {
            builder.set_text("title", Some(title.clone()));
        }
        if let Some(slug) = &changes.slug {
            builder.set_text("slug", Some(slug.clone()));
        }
        if let Some(content) = &changes.content {
            builder.set_text("content", Some(content.clone()));
        }
        if let Some(excerpt) = &changes.excerpt {
            builder.set_text("excerpt", excerpt.clone());
        }
        if let Some(image) = &changes.featured_image {
            builder.set_text("featured_image", image.clone());
        }
        if let Some(category_id) = &changes.category_id {
            builder.set_text("category_id", category_id.clone());
        }
        if let Some(status) = changes.status {
            builder.set_text("status", Some(status.as_str().to_string()));
        }
        if let Some(published_at) = changes.published_at {
            builder.set_timestamp("published_at", Some(published_at));
        }
        builder.set_timestamp("updated_at", Some(Utc::now()));

        let tag_ids = changes.tag_ids.as_deref().map(distinct);

        let affected = with_pool!(self.pool, |pool| {
            let mut tx = pool.begin().await.context("Failed to begin transaction")?;
            let affected = tx.apply_update(&builder, id).await?;

            if affected > 0 {
                if let Some(tag_ids) = &tag_ids {
                    sqlx::query("DELETE FROM blog_tags WHERE blog_id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                        .context("Failed to clear blog tags")?;
                    for tag_id in tag_ids {
                        sqlx::query(INSERT_BLOG_TAG)
                            .bind(id)
                            .bind(tag_id)
                            .execute(&mut *tx)
                            .await
                            .context("Failed to attach tag to blog")?;
                    }
                }
            }

            tx.commit().await.context("Failed to commit blog update")?;
            affected
        });

        Ok(affected > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let affected = with_pool!(self.pool, |pool| {
            let mut tx = pool.begin().await.context("Failed to begin transaction")?;
            sqlx::query("DELETE FROM blog_tags WHERE blog_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to clear blog tags")?;
            let affected = sqlx::query("DELETE FROM blogs WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete blog")?
                .rows_affected();
            tx.commit().await.context("Failed to commit blog deletion")?;
            affected
        });

        Ok(affected > 0)
    }
}

/// Drop repeated ids while keeping first-seen order
fn distinct(ids: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(id.clone());
        }
    }
    seen
}

fn row_to_blog(row: &impl DecodeRow) -> Result<Blog> {
    Ok(Blog {
        id: row.text("id")?,
        title: row.text("title")?,
        slug: row.text("slug")?,
        content: row.text("content")?,
        excerpt: row.opt_text("excerpt")?,
        featured_image: row.opt_text("featured_image")?,
        category_id: row.opt_text("category_id")?,
        category_name: row.opt_text("category_name")?,
        category_slug: row.opt_text("category_slug")?,
        status: BlogStatus::from_str(&row.text("status")?)?,
        author_id: row.text("author_id")?,
        author_name: row.opt_text("author_name")?,
        author_email: row.opt_text("author_email")?,
        published_at: row.opt_timestamp("published_at")?,
        created_at: row.timestamp("created_at")?,
        updated_at: row.timestamp("updated_at")?,
        tags: Vec::new(),
    })
}

fn row_to_tag_ref(row: &impl DecodeRow) -> Result<TagRef> {
    Ok(TagRef {
        id: row.text("id")?,
        name: row.text("name")?,
        slug: row.text("slug")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, SqlxCategoryRepository, SqlxTagRepository, SqlxUserRepository,
        TagRepository, UserRepository,
    };
    use crate::db::{create_test_pool, is_foreign_key_violation, is_unique_violation};
    use crate::db::migrations::run_migrations;
    use crate::models::UserRole;

    struct Fixture {
        pool: DynDatabasePool,
        blogs: Arc<dyn BlogRepository>,
        tags: Arc<dyn TagRepository>,
        categories: Arc<dyn CategoryRepository>,
        author_id: String,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        let author = SqlxUserRepository::new(pool.clone())
            .create("author@example.com", "hash", "Author", UserRole::Admin)
            .await
            .unwrap();

        Fixture {
            blogs: SqlxBlogRepository::boxed(pool.clone()),
            tags: SqlxTagRepository::boxed(pool.clone()),
            categories: SqlxCategoryRepository::boxed(pool.clone()),
            pool,
            author_id: author.id,
        }
    }

    fn new_blog(fx: &Fixture, title: &str, status: BlogStatus) -> NewBlog {
        NewBlog {
            title: title.to_string(),
            slug: crate::utils::generate_slug(title),
            content: format!("{} body", title),
            excerpt: None,
            featured_image: None,
            category_id: None,
            status,
            author_id: fx.author_id.clone(),
            published_at: (status == BlogStatus::Published).then(Utc::now),
            tag_ids: Vec::new(),
        }
    }

    async fn blog_tag_rows(pool: &DynDatabasePool, blog_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM blog_tags WHERE blog_id = ?")
            .bind(blog_id)
            .fetch_one(pool.sqlite().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_with_tags_and_category() {
        let fx = setup().await;
        let category = fx.categories.create("Rust", "rust", None).await.unwrap();
        let async_tag = fx.tags.create("async", "async").await.unwrap();
        let tokio_tag = fx.tags.create("tokio", "tokio").await.unwrap();

        let mut input = new_blog(&fx, "Hello World", BlogStatus::Published);
        input.category_id = Some(category.id.clone());
        input.tag_ids = vec![tokio_tag.id.clone(), async_tag.id.clone(), tokio_tag.id.clone()];

        let blog = fx.blogs.create(&input).await.unwrap();
        assert_eq!(blog.slug, "hello-world");
        assert_eq!(blog.category_name.as_deref(), Some("Rust"));
        assert_eq!(blog.author_name.as_deref(), Some("Author"));
        assert!(blog.published_at.is_some());

        let names: Vec<&str> = blog.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["async", "tokio"]);

        let by_slug = fx.blogs.get_by_slug("hello-world").await.unwrap().unwrap();
        assert_eq!(by_slug.id, blog.id);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_unique_violation() {
        let fx = setup().await;
        fx.blogs
            .create(&new_blog(&fx, "Same Title", BlogStatus::Draft))
            .await
            .unwrap();
        let err = fx
            .blogs
            .create(&new_blog(&fx, "Same Title", BlogStatus::Draft))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_unknown_tag_rolls_back_insert() {
        let fx = setup().await;
        let mut input = new_blog(&fx, "Orphan", BlogStatus::Draft);
        input.tag_ids = vec!["missing".to_string()];

        let err = fx.blogs.create(&input).await.unwrap_err();
        assert!(is_foreign_key_violation(&err));
        assert!(fx.blogs.get_by_slug("orphan").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let fx = setup().await;
        let category = fx.categories.create("News", "news", None).await.unwrap();

        for i in 0..12 {
            let status = if i % 3 == 0 { BlogStatus::Draft } else { BlogStatus::Published };
            let mut input = new_blog(&fx, &format!("Post {}", i), status);
            if i < 4 {
                input.category_id = Some(category.id.clone());
            }
            fx.blogs.create(&input).await.unwrap();
        }

        let published = BlogFilter {
            status: Some(BlogStatus::Published),
            category_slug: None,
        };
        let page = fx
            .blogs
            .list(&published, &ListParams::new(2, 5))
            .await
            .unwrap();
        assert_eq!(page.total, 8);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_pages(), 2);
        assert!(page.items.iter().all(|b| b.is_published()));
        assert!(page
            .items
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));

        let in_news = BlogFilter {
            status: None,
            category_slug: Some("news".to_string()),
        };
        let page = fx.blogs.list(&in_news, &ListParams::default()).await.unwrap();
        assert_eq!(page.total, 4);
        assert!(page
            .items
            .iter()
            .all(|b| b.category_slug.as_deref() == Some("news")));
    }

    #[tokio::test]
    async fn test_update_replaces_tags_only_when_supplied() {
        let fx = setup().await;
        let a = fx.tags.create("a", "a").await.unwrap();
        let b = fx.tags.create("b", "b").await.unwrap();

        let mut input = new_blog(&fx, "Tagged", BlogStatus::Draft);
        input.tag_ids = vec![a.id.clone()];
        let blog = fx.blogs.create(&input).await.unwrap();

        let changes = BlogChanges {
            content: Some("edited".to_string()),
            ..Default::default()
        };
        assert!(fx.blogs.update(&blog.id, &changes).await.unwrap());
        let reloaded = fx.blogs.get_by_id(&blog.id).await.unwrap().unwrap();
        assert_eq!(reloaded.content, "edited");
        assert_eq!(reloaded.tags.len(), 1);

        let changes = BlogChanges {
            tag_ids: Some(vec![b.id.clone()]),
            ..Default::default()
        };
        assert!(fx.blogs.update(&blog.id, &changes).await.unwrap());
        let reloaded = fx.blogs.get_by_id(&blog.id).await.unwrap().unwrap();
        assert_eq!(reloaded.tags.len(), 1);
        assert_eq!(reloaded.tags[0].id, b.id);
        assert!(reloaded.updated_at >= blog.updated_at);

        assert!(!fx.blogs.update("missing", &changes).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_clears_nullable_fields() {
        let fx = setup().await;
        let category = fx.categories.create("Misc", "misc", None).await.unwrap();
        let mut input = new_blog(&fx, "Clearable", BlogStatus::Draft);
        input.category_id = Some(category.id);
        input.excerpt = Some("short".to_string());
        let blog = fx.blogs.create(&input).await.unwrap();

        let changes = BlogChanges {
            category_id: Some(None),
            excerpt: Some(None),
            ..Default::default()
        };
        fx.blogs.update(&blog.id, &changes).await.unwrap();

        let reloaded = fx.blogs.get_by_id(&blog.id).await.unwrap().unwrap();
        assert!(reloaded.category_id.is_none());
        assert!(reloaded.category_name.is_none());
        assert!(reloaded.excerpt.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_tag_rows() {
        let fx = setup().await;
        let tag = fx.tags.create("gone", "gone").await.unwrap();
        let mut input = new_blog(&fx, "Doomed", BlogStatus::Published);
        input.tag_ids = vec![tag.id];
        let blog = fx.blogs.create(&input).await.unwrap();
        assert_eq!(blog_tag_rows(&fx.pool, &blog.id).await, 1);

        assert!(fx.blogs.delete(&blog.id).await.unwrap());
        assert_eq!(blog_tag_rows(&fx.pool, &blog.id).await, 0);
        assert!(fx.blogs.get_by_id(&blog.id).await.unwrap().is_none());
        assert!(!fx.blogs.delete(&blog.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_category_nulls_blog_reference() {
        let fx = setup().await;
        let category = fx.categories.create("Temp", "temp", None).await.unwrap();
        let mut input = new_blog(&fx, "Survivor", BlogStatus::Draft);
        input.category_id = Some(category.id.clone());
        let blog = fx.blogs.create(&input).await.unwrap();

        fx.categories.delete(&category.id).await.unwrap();

        let reloaded = fx.blogs.get_by_id(&blog.id).await.unwrap().unwrap();
        assert!(reloaded.category_id.is_none());
    }
}
