use sea_orm::{
    sea_query::{Alias, BinOper, Expr, Func, SimpleExpr},
    ColumnTrait, DbBackend,
};

use crate::entities::product;

const TEXT_SEARCH_CONFIG: &str = "english";

/// Normalized free-text query. Built once per request; the match predicate and
/// the relevance score are both derived from the same normalized tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTerm {
    tokens: Vec<String>,
}

/// Match predicate plus the score used for `ORDER BY score DESC, id ASC`.
#[derive(Clone, Debug)]
pub struct RankedSearch {
    pub predicate: SimpleExpr,
    pub score: SimpleExpr,
}

impl SearchTerm {
    /// Returns `None` for absent, blank or punctuation-only input, which the
    /// listing treats as an unranked query.
    pub fn parse(input: Option<&str>) -> Option<Self> {
        let tokens: Vec<String> = input?
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect::<String>()
            })
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn normalized(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn rank(&self, backend: DbBackend) -> RankedSearch {
        match backend {
            DbBackend::Postgres => self.rank_tsvector(),
            DbBackend::Sqlite | DbBackend::MySql => self.rank_like(),
        }
    }

    /// `search_vector @@ plainto_tsquery(..)` ranked by `ts_rank`.
    ///
    /// The config is bound as text, so it has to be cast: there is no
    /// `plainto_tsquery(text, text)` overload.
    fn rank_tsvector(&self) -> RankedSearch {
        let vector = Expr::col((product::Entity, Alias::new("search_vector")));
        let config = Func::cast_as(Expr::val(TEXT_SEARCH_CONFIG), Alias::new("regconfig"));
        let query: SimpleExpr = Func::cust(Alias::new("plainto_tsquery"))
            .arg(config)
            .arg(self.normalized())
            .into();

        let predicate = vector
            .clone()
            .binary(BinOper::Custom("@@"), query.clone());
        let score = Func::cust(Alias::new("ts_rank"))
            .arg(vector)
            .arg(query)
            .into();

        RankedSearch { predicate, score }
    }

    /// Substring fallback for stores without a text-search engine: every token
    /// must appear in the name or description; a hit in the name weighs twice
    /// a hit in the description.
    fn rank_like(&self) -> RankedSearch {
        let mut predicate: SimpleExpr = Expr::val(true).into();
        let mut score: SimpleExpr = Expr::val(0).into();

        for token in &self.tokens {
            let pattern = format!("%{token}%");
            let in_name = product::Column::Name.like(&pattern);
            let in_description = product::Column::Description.like(&pattern);

            predicate = predicate.and(in_name.clone().or(in_description.clone()));
            score = score
                .add(SimpleExpr::Case(Box::new(Expr::case(in_name, 2).finally(0))))
                .add(SimpleExpr::Case(Box::new(Expr::case(in_description, 1).finally(0))));
        }

        RankedSearch { predicate, score }
    }
}
