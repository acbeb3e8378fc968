use bigdecimal::BigDecimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub active: bool,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Storefront browsing filter. Only active products are ever listed.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name, matched literally.
    pub search: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    /// Any of these categories; empty means every category.
    pub categories: Vec<i64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        product.active
            && self.search.as_deref().map_or(true, |term| {
                product.name.to_lowercase().contains(&term.to_lowercase())
            })
            && self.min_price.as_ref().map_or(true, |min| &product.price >= min)
            && self.max_price.as_ref().map_or(true, |max| &product.price <= max)
            && (self.categories.is_empty()
                || product
                    .category_id
                    .is_some_and(|id| self.categories.contains(&id)))
    }
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(name: &str, price: &str, active: bool) -> Product {
        Product {
            id: 1,
            name: name.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            stock: 10,
            active,
            category_id: None,
        }
    }

    #[test]
    fn empty_filter_matches_only_active_products() {
        let filter = ProductFilter::default();
        assert!(filter.matches(&product("Mug", "8.00", true)));
        assert!(!filter.matches(&product("Mug", "8.00", false)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = ProductFilter {
            min_price: Some(BigDecimal::from(8)),
            max_price: Some(BigDecimal::from(10)),
            ..Default::default()
        };
        assert!(filter.matches(&product("Mug", "8.00", true)));
        assert!(filter.matches(&product("Mug", "10.00", true)));
        assert!(!filter.matches(&product("Mug", "10.01", true)));
    }

    #[test]
    fn search_matches_name_substring_ignoring_case() {
        let filter = ProductFilter {
            search: Some("tea".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product("Green Tea Tin", "4.00", true)));
        assert!(!filter.matches(&product("Coffee Tin", "4.00", true)));
    }

    #[test]
    fn search_wildcards_are_literal() {
        let filter = ProductFilter {
            search: Some("%".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&product("Green Tea", "4.00", true)));
        assert!(filter.matches(&product("100% Cotton", "4.00", true)));
    }

    #[test]
    fn category_filter_keeps_listed_categories_only() {
        let filter = ProductFilter {
            categories: vec![2, 3],
            ..Default::default()
        };
        let mut mug = product("Mug", "8.00", true);
        assert!(!filter.matches(&mug), "uncategorised products are excluded");
        mug.category_id = Some(3);
        assert!(filter.matches(&mug));
        mug.category_id = Some(1);
        assert!(!filter.matches(&mug));
    }
}
