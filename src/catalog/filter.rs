use sea_orm::{
    sea_query::SimpleExpr, ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait, Select,
};
use serde::Deserialize;

use crate::catalog::error::CatalogError;
use crate::entities::{category, product};

/// Optional product filters. Every present field adds one predicate; all
/// predicates are ANDed.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
    pub seller_id: Option<i32>,
}

impl ProductFilter {
    pub fn check_range(&self) -> Result<(), CatalogError> {
        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) if min > max => Err(CatalogError::InvalidRange(format!(
                "min_price ({min}) cannot be greater than max_price ({max})"
            ))),
            _ => Ok(()),
        }
    }

    /// Builds the predicate set for this filter on top of the soft-delete
    /// predicates. Fails before any store access on an inverted price range.
    pub fn predicates(&self) -> Result<PredicateSet, CatalogError> {
        self.check_range()?;

        let mut set = PredicateSet::active();
        if let Some(category_id) = self.category_id {
            set.push(product::Column::CategoryId.eq(category_id));
        }
        if let Some(min) = self.min_price {
            set.push(product::Column::Price.gte(min));
        }
        if let Some(max) = self.max_price {
            set.push(product::Column::Price.lte(max));
        }
        match self.in_stock {
            Some(true) => set.push(product::Column::Stock.gt(0)),
            Some(false) => set.push(product::Column::Stock.eq(0)),
            None => {}
        }
        if let Some(seller_id) = self.seller_id {
            set.push(product::Column::SellerId.eq(seller_id));
        }
        Ok(set)
    }
}

/// Conjunction of predicates over products joined with their category.
///
/// Always starts with `product.is_active` and `category.is_active`, so no read
/// path built from it can leak soft-deleted rows.
#[derive(Clone, Debug)]
pub struct PredicateSet {
    predicates: Vec<SimpleExpr>,
}

impl PredicateSet {
    pub fn active() -> Self {
        Self {
            predicates: vec![
                product::Column::IsActive.eq(true),
                category::Column::IsActive.eq(true),
            ],
        }
    }

    pub fn push(&mut self, predicate: SimpleExpr) {
        self.predicates.push(predicate);
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn condition(&self) -> Condition {
        self.predicates
            .iter()
            .cloned()
            .fold(Condition::all(), |condition, predicate| condition.add(predicate))
    }

    /// Fresh unordered, unwindowed select. Count and page queries both start
    /// here.
    pub fn select(&self) -> Select<product::Entity> {
        product::Entity::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .filter(self.condition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::error::ErrorKind;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn inverted_range_is_rejected() {
        let filter = ProductFilter {
            min_price: Some(50.0),
            max_price: Some(10.0),
            ..Default::default()
        };
        let err = filter.predicates().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let filter = ProductFilter {
            min_price: Some(10.0),
            max_price: Some(10.0),
            ..Default::default()
        };
        assert_eq!(filter.predicates().unwrap().len(), 4);
    }

    #[test]
    fn empty_filter_keeps_soft_delete_predicates() {
        let set = ProductFilter::default().predicates().unwrap();
        assert_eq!(set.len(), 2);

        let sql = set.select().build(DbBackend::Sqlite).to_string();
        assert!(sql.contains(r#""products"."is_active" ="#), "{sql}");
        assert!(sql.contains(r#""categories"."is_active" ="#), "{sql}");
        assert!(sql.contains("INNER JOIN"), "{sql}");
    }

    #[test]
    fn stock_filter_has_three_states() {
        let in_stock = ProductFilter {
            in_stock: Some(true),
            ..Default::default()
        };
        let sql = in_stock.predicates().unwrap().select().build(DbBackend::Sqlite).to_string();
        assert!(sql.contains(r#""products"."stock" > 0"#), "{sql}");

        let out_of_stock = ProductFilter {
            in_stock: Some(false),
            ..Default::default()
        };
        let sql = out_of_stock
            .predicates()
            .unwrap()
            .select()
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#""products"."stock" = 0"#), "{sql}");
    }

    #[test]
    fn every_filter_adds_a_predicate() {
        let filter = ProductFilter {
            category_id: Some(1),
            min_price: Some(1.0),
            max_price: Some(2.0),
            in_stock: Some(true),
            seller_id: Some(3),
        };
        assert_eq!(filter.predicates().unwrap().len(), 7);
    }
}
