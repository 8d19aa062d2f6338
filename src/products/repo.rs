use crate::db::{Collection, RecordStore};
use crate::products::repo_types::Product;

impl Product {
    pub async fn load_all(store: &RecordStore) -> anyhow::Result<Vec<Product>> {
        store.load(Collection::Products).await
    }

    pub async fn save_all(store: &RecordStore, products: &[Product]) -> anyhow::Result<()> {
        store.save(Collection::Products, products).await
    }

    /// First product with the given id.
    pub fn find(products: &[Product], id: u64) -> Option<&Product> {
        products.iter().find(|p| p.id == id)
    }

    pub fn find_mut(products: &mut [Product], id: u64) -> Option<&mut Product> {
        products.iter_mut().find(|p| p.id == id)
    }

    pub fn max_id(products: &[Product]) -> u64 {
        products.iter().map(|p| p.id).max().unwrap_or(0)
    }

    /// Case-insensitive substring match on title or brand. An empty query
    /// matches everything.
    pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
        let query = query.trim().to_lowercase();
        products
            .iter()
            .filter(|p| {
                query.is_empty()
                    || p.title.to_lowercase().contains(&query)
                    || p.brand.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Mean review rating rounded to two decimals, or the stored rating when
    /// there are no reviews.
    pub fn computed_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return self.rating;
        }
        let sum: f64 = self.reviews.iter().map(|r| f64::from(r.rating)).sum();
        let avg = sum / self.reviews.len() as f64;
        (avg * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::repo_types::Review;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "ASUS Vivobook 15".into(), "".into(), 900.0, "Asus".into()),
            Product::new(2, "ThinkPad X1".into(), "".into(), 1800.0, "Lenovo".into()),
            Product::new(3, "Pavilion".into(), "".into(), 700.0, "HP".into()),
        ]
    }

    #[test]
    fn find_by_id() {
        let products = catalog();
        assert_eq!(Product::find(&products, 2).map(|p| p.title.as_str()), Some("ThinkPad X1"));
        assert!(Product::find(&products, 42).is_none());
        assert_eq!(Product::max_id(&products), 3);
        assert_eq!(Product::max_id(&[]), 0);
    }

    #[test]
    fn search_matches_title_or_brand_ignoring_case() {
        let products = catalog();
        let ids = |q: &str| Product::search(&products, q).iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids("asus"), vec![1]);
        assert_eq!(ids("LENOVO"), vec![2]);
        assert_eq!(ids("pad"), vec![2]);
        assert_eq!(ids(""), vec![1, 2, 3]);
        assert!(ids("macbook").is_empty());
    }

    #[test]
    fn rating_averages_reviews() {
        let mut product = catalog().remove(0);
        product.rating = 4.2;
        assert_eq!(product.computed_rating(), 4.2);

        for rating in [5, 4, 4] {
            product.reviews.push(Review {
                rating,
                comment: "ok".into(),
                date: "2024-01-01T00:00:00Z".into(),
                reviewer_name: "alice".into(),
            });
        }
        assert_eq!(product.computed_rating(), 4.33);
    }

    #[test]
    fn legacy_record_gets_defaults() {
        let raw = r#"{"id": 7, "title": "Acer Nitro", "price": 1299.5, "stock": 3}"#;
        let product: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(product.rating, 5.0);
        assert_eq!(product.warranty_information, "1 year warranty");
        assert_eq!(product.sold, 0);
        assert!(product.reviews.is_empty());

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["discountPercentage"], 0.0);
        assert!(back.get("category").is_none());
    }
}
