use serde::{Deserialize, Serialize};

/// Products shown on the home page.
pub const HOME_PAGE_LIMIT: i64 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    CreatedAt,
    Price,
    Name,
}

impl ProductSort {
    pub fn column(&self) -> &'static str {
        match self {
            ProductSort::CreatedAt => "created_at",
            ProductSort::Price => "price",
            ProductSort::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductQueryFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match on the product name
    pub search: Option<String>,
    pub show_on_home: Option<bool>,
    pub sort: Option<ProductSort>,
    pub order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductQueryFilter {
    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_show_on_home(mut self, show: bool) -> Self {
        self.show_on_home = Some(show);
        self
    }

    pub fn sorted_by(mut self, sort: ProductSort, order: SortOrder) -> Self {
        self.sort = Some(sort);
        self.order = Some(order);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.search.is_none() && self.show_on_home.is_none()
    }

    /// The home page highlights: flagged products, newest first.
    pub fn home_page() -> Self {
        Self::default()
            .with_show_on_home(true)
            .sorted_by(ProductSort::CreatedAt, SortOrder::Desc)
            .with_limit(HOME_PAGE_LIMIT)
    }
}
