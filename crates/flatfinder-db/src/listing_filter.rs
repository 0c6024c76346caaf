//! Listing filter query builder.
//!
//! Compiles a [`ListingFilter`] into SQL with positional parameters. Values
//! are never interpolated into the statement text; every value is bound.

use std::fmt;

use flatfinder_core::{KnownField, ListingFilter, StructuredField};

use crate::escape_like;

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// 32-bit integer parameter (INTEGER columns).
    Int(i32),
    /// 64-bit integer parameter (LIMIT).
    BigInt(i64),
    /// Float parameter (NUMERIC columns compared as float8).
    Float(f64),
    /// Boolean parameter.
    Bool(bool),
    /// String parameter.
    String(String),
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::BigInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
        }
    }
}

/// Comparison operator of a single predicate clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Lte,
    Gte,
    /// Case-insensitive substring match; the bound value carries the `%`s.
    ILike,
}

impl ComparisonOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::ILike => "ILIKE",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One `(column, operator, value)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateClause {
    pub field: KnownField,
    pub column: &'static str,
    pub op: ComparisonOp,
    pub param: QueryParam,
}

impl PredicateClause {
    fn from_field(field: &StructuredField) -> Self {
        let (op, param) = match field {
            StructuredField::Location(loc) => (
                ComparisonOp::ILike,
                QueryParam::String(format!("%{}%", escape_like(loc))),
            ),
            StructuredField::Rooms(n) | StructuredField::Beds(n) | StructuredField::Floor(n) => {
                (ComparisonOp::Eq, QueryParam::Int(*n))
            }
            StructuredField::Area(v) | StructuredField::Price(v) => {
                (ComparisonOp::Eq, QueryParam::Float(*v))
            }
            StructuredField::MinPrice(v) => (ComparisonOp::Gte, QueryParam::Float(*v)),
            StructuredField::MaxPrice(v) => (ComparisonOp::Lte, QueryParam::Float(*v)),
            StructuredField::HasWifi(b)
            | StructuredField::HasParking(b)
            | StructuredField::HasKitchen(b) => (ComparisonOp::Eq, QueryParam::Bool(*b)),
        };

        let known = field.field();
        Self {
            field: known,
            column: known.column(),
            op,
            param,
        }
    }
}

/// Columns selected for each candidate row.
///
/// Nullable store columns are coalesced so every row decodes into a full
/// listing; `price` and `area` are NUMERIC and read as float8.
pub const LISTING_COLUMNS: &str = "id, \
     COALESCE(location, '') AS location, \
     COALESCE(rooms, 0) AS rooms, \
     COALESCE(price, 0)::float8 AS price, \
     COALESCE(area, 0)::float8 AS area, \
     COALESCE(floor, 0) AS floor, \
     COALESCE(beds, 0) AS beds, \
     COALESCE(has_wifi, FALSE) AS has_wifi, \
     COALESCE(has_parking, FALSE) AS has_parking, \
     COALESCE(has_kitchen, FALSE) AS has_kitchen, \
     COALESCE(description, '') AS description, \
     embedding";

/// Generates SQL for a listing filter.
///
/// # Example
///
/// ```
/// use flatfinder_core::{ListingFilter, StructuredField};
/// use flatfinder_db::{ListingFilterQueryBuilder, QueryParam};
///
/// let filter = ListingFilter::new()
///     .with_field(StructuredField::Location("Lviv".into()))
///     .with_field(StructuredField::Rooms(2));
///
/// let (sql, params) = ListingFilterQueryBuilder::new(filter, 0).build();
/// assert_eq!(sql, "location ILIKE $1 AND rooms = $2");
/// assert_eq!(params, vec![QueryParam::String("%Lviv%".into()), QueryParam::Int(2)]);
/// ```
pub struct ListingFilterQueryBuilder {
    filter: ListingFilter,
    param_offset: usize,
}

impl ListingFilterQueryBuilder {
    /// Create a new builder for the given filter.
    ///
    /// # Parameters
    ///
    /// * `filter` - The listing filter
    /// * `param_offset` - Number of parameters already bound before this fragment
    pub fn new(filter: ListingFilter, param_offset: usize) -> Self {
        Self {
            filter,
            param_offset,
        }
    }

    /// One clause per structured field, in canonical order.
    pub fn clauses(&self) -> Vec<PredicateClause> {
        self.filter
            .fields()
            .iter()
            .map(PredicateClause::from_field)
            .collect()
    }

    /// Build the WHERE clause fragment.
    ///
    /// Returns the fragment and its parameters in placeholder order. An empty
    /// filter yields `("TRUE", [])`.
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = self.param_offset;

        for clause in self.clauses() {
            param_idx += 1;
            clauses.push(format!("{} {} ${}", clause.column, clause.op, param_idx));
            params.push(clause.param);
        }

        let sql = if clauses.is_empty() {
            "TRUE".to_string()
        } else {
            clauses.join(" AND ")
        };

        (sql, params)
    }

    /// Build the complete candidate query against `table`.
    ///
    /// Appends `ORDER BY <table>.price ASC NULLS LAST LIMIT $n` with the row
    /// cap bound as the final parameter. `table` must already be a validated
    /// identifier.
    ///
    /// The sort key is table-qualified so it resolves to the stored column,
    /// not the coalesced `price` output alias.
    pub fn build_select(&self, table: &str) -> (String, Vec<QueryParam>) {
        let (where_sql, mut params) = self.build();
        let limit_idx = self.param_offset + params.len() + 1;

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}.price ASC NULLS LAST LIMIT ${}",
            LISTING_COLUMNS, table, where_sql, table, limit_idx
        );
        params.push(QueryParam::BigInt(self.filter.limit()));

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatfinder_core::{classify, AttributeMapping};

    fn builder_for(mapping: AttributeMapping) -> ListingFilterQueryBuilder {
        ListingFilterQueryBuilder::new(ListingFilter::from_classified(&classify(&mapping)), 0)
    }

    #[test]
    fn test_empty_filter_returns_true() {
        let builder = ListingFilterQueryBuilder::new(ListingFilter::new(), 0);
        let (sql, params) = builder.build();

        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_filter_select_matches_all_capped() {
        let builder = ListingFilterQueryBuilder::new(ListingFilter::new(), 0);
        let (sql, params) = builder.build_select("apartments");

        assert!(sql.ends_with("FROM apartments WHERE TRUE ORDER BY apartments.price ASC NULLS LAST LIMIT $1"));
        assert_eq!(params, vec![QueryParam::BigInt(20)]);
    }

    #[test]
    fn test_location_rooms_wifi_example() {
        let builder = builder_for(
            AttributeMapping::new()
                .with("location", "Lviv")
                .with("rooms", 2)
                .with("has_wifi", true),
        );

        let (sql, params) = builder.build_select("apartments");

        assert!(sql.contains(
            "WHERE location ILIKE $1 AND rooms = $2 AND has_wifi = $3 \
             ORDER BY apartments.price ASC NULLS LAST LIMIT $4"
        ));
        assert_eq!(
            params,
            vec![
                QueryParam::String("%Lviv%".to_string()),
                QueryParam::Int(2),
                QueryParam::Bool(true),
                QueryParam::BigInt(20),
            ]
        );
        // Values are bound, never inlined
        assert!(!sql.contains("Lviv"));
    }

    #[test]
    fn test_one_clause_per_known_key() {
        let mapping = AttributeMapping::new()
            .with("location", "Kyiv")
            .with("rooms", 3)
            .with("beds", 2)
            .with("area", 70.5)
            .with("floor", 4)
            .with("price", 100.0)
            .with("min_price", 50)
            .with("max_price", 150)
            .with("has_wifi", true)
            .with("has_parking", false)
            .with("has_kitchen", true);

        let builder = builder_for(mapping);
        let clauses = builder.clauses();
        let (sql, params) = builder.build();

        assert_eq!(clauses.len(), 11);
        assert_eq!(params.len(), 11);
        assert_eq!(sql.matches(" AND ").count(), 10);
        for i in 1..=11 {
            assert!(sql.contains(&format!("${}", i)), "missing ${}", i);
        }
        assert_eq!(
            clauses.iter().map(|c| c.field).collect::<Vec<_>>(),
            KnownField::ALL.to_vec()
        );
    }

    #[test]
    fn test_price_operators_share_column() {
        let builder = builder_for(
            AttributeMapping::new()
                .with("price", 80)
                .with("min_price", 50)
                .with("max_price", 120),
        );

        let (sql, params) = builder.build();

        assert_eq!(sql, "price = $1 AND price >= $2 AND price <= $3");
        assert_eq!(
            params,
            vec![
                QueryParam::Float(80.0),
                QueryParam::Float(50.0),
                QueryParam::Float(120.0),
            ]
        );
    }

    #[test]
    fn test_boolean_false_is_bound() {
        let (sql, params) = builder_for(AttributeMapping::new().with("has_parking", false)).build();
        assert_eq!(sql, "has_parking = $1");
        assert_eq!(params, vec![QueryParam::Bool(false)]);
    }

    #[test]
    fn test_unknown_and_uncoercible_fields_are_omitted() {
        let builder = builder_for(
            AttributeMapping::new()
                .with("allows_pets", true)
                .with("rooms", "many")
                .with("beds", 1),
        );

        let (sql, params) = builder.build();

        assert_eq!(sql, "beds = $1");
        assert_eq!(params, vec![QueryParam::Int(1)]);
    }

    #[test]
    fn test_location_wildcards_are_escaped() {
        let (_, params) =
            builder_for(AttributeMapping::new().with("location", "50%_off\\")).build();
        assert_eq!(
            params,
            vec![QueryParam::String("%50\\%\\_off\\\\%".to_string())]
        );
    }

    #[test]
    fn test_injection_attempt_stays_in_parameter() {
        let hostile = "x'; DROP TABLE apartments; --";
        let (sql, params) = builder_for(AttributeMapping::new().with("location", hostile))
            .build_select("apartments");

        assert!(!sql.contains("DROP"));
        assert_eq!(params[0], QueryParam::String(format!("%{}%", hostile)));
    }

    #[test]
    fn test_param_offset() {
        let filter = ListingFilter::new().with_field(StructuredField::Rooms(1));
        let builder = ListingFilterQueryBuilder::new(filter, 5);

        let (sql, params) = builder.build_select("apartments");

        assert!(sql.contains("rooms = $6"));
        assert!(sql.ends_with("LIMIT $7"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_custom_limit_is_bound() {
        let filter = ListingFilter::new().with_limit(50);
        let (_, params) = ListingFilterQueryBuilder::new(filter, 0).build_select("apartments");
        assert_eq!(params, vec![QueryParam::BigInt(50)]);
    }

    #[test]
    fn test_param_display() {
        assert_eq!(QueryParam::Int(2).to_string(), "2");
        assert_eq!(QueryParam::Float(99.5).to_string(), "99.5");
        assert_eq!(QueryParam::Bool(true).to_string(), "true");
        assert_eq!(QueryParam::String("%O'Hara%".into()).to_string(), "'%O''Hara%'");
    }

    #[test]
    fn test_builder_is_deterministic() {
        let mapping = AttributeMapping::new()
            .with("has_kitchen", true)
            .with("location", "Lviv")
            .with("max_price", 90);

        let first = builder_for(mapping.clone()).build_select("apartments");
        for _ in 0..3 {
            assert_eq!(builder_for(mapping.clone()).build_select("apartments"), first);
        }
    }
}
