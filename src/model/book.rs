use crate::model::validation::FieldErrors;
use chrono::{DateTime, NaiveDate, Utc};
use list_sync::{FilterSpec, ListDefaults, ListResource, QueryError, SortOrder};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Filter key for the book list; repeatable, one value per category id.
pub const CATEGORIES: &str = "categories";

/// A book in the catalogue as the admin API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub author: String,
    #[serde(default)]
    pub published_date: Option<String>,
    pub quantity: u32,
    pub available: u32,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub category: Vec<CategoryTag>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The category summary embedded in a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl ListResource for Book {
    const NAME: &'static str = "books";

    fn defaults() -> ListDefaults {
        ListDefaults::default().sorted_by("createdAt", SortOrder::Desc)
    }

    fn filters() -> &'static [FilterSpec] {
        const FILTERS: &[FilterSpec] = &[FilterSpec::repeatable(CATEGORIES)];
        FILTERS
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// An uploaded cover image.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl CoverImage {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Create/edit form for a book, submitted as multipart.
#[derive(Debug, Clone, Default, Validate)]
pub struct BookForm {
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub published_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Quantity must be at least 0"))]
    pub quantity: i64,
    #[validate(range(min = 0, message = "Available must be at least 0"))]
    pub available: i64,
    #[validate(length(min = 1, message = "Select at least one category"))]
    pub categories: Vec<String>,
    /// `None` keeps the current cover on update.
    pub cover: Option<CoverImage>,
}

impl BookForm {
    /// Checks every rule; nothing reaches the network when this fails.
    pub fn check(&self, max_cover_bytes: usize) -> Result<(), QueryError> {
        let mut errors = FieldErrors::from_rules(self);
        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", "Title is required");
        } else if title.chars().count() < 3 {
            errors.add("title", "Title must be at least 3 characters");
        }
        if self.published_date.is_none() {
            errors.add("published_date", "Published date is required");
        }
        if self.available > self.quantity {
            errors.add("available", "Available cannot exceed quantity");
        }
        if let Some(cover) = &self.cover {
            if !cover.mime.starts_with("image/") {
                errors.add("cover", "Cover must be an image");
            } else if cover.bytes.len() > max_cover_bytes {
                errors.add(
                    "cover",
                    format!("Cover must be at most {} bytes", max_cover_bytes),
                );
            }
        }
        errors.into_result()
    }

    /// Text parts of the multipart body. Categories repeat as `category[]`.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_string(), self.title.trim().to_string()),
            ("description".to_string(), self.description.clone()),
            ("author".to_string(), self.author.trim().to_string()),
        ];
        if let Some(date) = self.published_date {
            fields.push(("publishedDate".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        fields.push(("quantity".to_string(), self.quantity.to_string()));
        fields.push(("available".to_string(), self.available.to_string()));
        for id in &self.categories {
            fields.push(("category[]".to_string(), id.clone()));
        }
        fields
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            description: book.description.clone(),
            author: book.author.clone(),
            published_date: book
                .published_date
                .as_deref()
                .and_then(|raw| raw.get(..10))
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
            quantity: i64::from(book.quantity),
            available: i64::from(book.available),
            categories: book.category.iter().map(|c| c.id.clone()).collect(),
            cover: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MIB: usize = 1024 * 1024;

    fn valid_form() -> BookForm {
        BookForm {
            title: "Dune".into(),
            description: "Desert planet".into(),
            author: "Frank Herbert".into(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1),
            quantity: 4,
            available: 2,
            categories: vec!["c1".into(), "c2".into()],
            cover: None,
        }
    }

    #[test]
    fn test_book_deserializes_server_shape() {
        let book: Book = serde_json::from_value(json!({
            "_id": "b1",
            "title": "Dune",
            "description": "",
            "author": "Frank Herbert",
            "publishedDate": "1965-08-01T00:00:00.000Z",
            "quantity": 4,
            "available": 2,
            "cover": "https://cdn/dune.jpg",
            "category": [{ "_id": "c1", "name": "Sci-Fi", "description": "" }],
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(book.id, "b1");
        assert_eq!(book.category[0].name, "Sci-Fi");
        assert!(book.created_at.is_some());
        assert_eq!(BookForm::from(&book).published_date, NaiveDate::from_ymd_opt(1965, 8, 1));
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().check(5 * MIB).is_ok());
    }

    #[test]
    fn test_form_rules() {
        let form = BookForm {
            title: "Du".into(),
            author: String::new(),
            published_date: None,
            quantity: 1,
            available: 3,
            categories: Vec::new(),
            ..valid_form()
        };
        let err = form.check(5 * MIB).unwrap_err();
        let fields = err.field_errors().unwrap();

        assert_eq!(fields["title"], "Title must be at least 3 characters");
        assert_eq!(fields["author"], "Author is required");
        assert_eq!(fields["published_date"], "Published date is required");
        assert_eq!(fields["available"], "Available cannot exceed quantity");
        assert_eq!(fields["categories"], "Select at least one category");
    }

    #[test]
    fn test_title_length_ignores_padding() {
        let form = BookForm {
            title: "  ab  ".into(),
            ..valid_form()
        };
        let err = form.check(5 * MIB).unwrap_err();
        assert_eq!(
            err.field_errors().unwrap()["title"],
            "Title must be at least 3 characters"
        );

        let form = BookForm {
            title: "   ".into(),
            ..valid_form()
        };
        let err = form.check(5 * MIB).unwrap_err();
        assert_eq!(err.field_errors().unwrap()["title"], "Title is required");

        let form = BookForm {
            title: " Dune ".into(),
            ..valid_form()
        };
        assert!(form.check(5 * MIB).is_ok());
        assert_eq!(form.text_fields()[0], ("title".to_string(), "Dune".to_string()));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let form = BookForm {
            quantity: -1,
            available: -2,
            ..valid_form()
        };
        let err = form.check(5 * MIB).unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["quantity"], "Quantity must be at least 0");
        assert_eq!(fields["available"], "Available must be at least 0");
    }

    #[test]
    fn test_cover_type_and_size() {
        let mut form = valid_form();
        form.cover = Some(CoverImage::new("a.pdf", "application/pdf", vec![0; 10]));
        assert_eq!(
            form.check(5 * MIB).unwrap_err().field_errors().unwrap()["cover"],
            "Cover must be an image"
        );

        form.cover = Some(CoverImage::new("a.png", "image/png", vec![0; 11]));
        assert!(form.check(10).is_err());
        assert!(form.check(11).is_ok());
    }

    #[test]
    fn test_text_fields_repeat_categories() {
        let fields = valid_form().text_fields();
        let categories: Vec<_> = fields
            .iter()
            .filter(|(k, _)| k == "category[]")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(categories, vec!["c1", "c2"]);
        assert!(fields.contains(&("publishedDate".to_string(), "1965-08-01".to_string())));
    }
}
