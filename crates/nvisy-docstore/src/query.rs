//! Select expression builder.

use strum::{AsRefStr, Display};

use crate::{Error, Result};

/// Sort direction of an `order by` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
enum Connective {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    connective: Connective,
    clause: String,
    args: Vec<String>,
}

impl Condition {
    /// Substitutes `?` placeholders with quoted arguments and parenthesizes
    /// the clause.
    fn render(&self) -> Result<String> {
        let mut args = self.args.iter();
        let mut rendered = String::with_capacity(self.clause.len());

        for c in self.clause.chars() {
            if c != '?' {
                rendered.push(c);
                continue;
            }
            let arg = args.next().ok_or_else(|| {
                Error::invalid_argument(format!(
                    "clause '{}' has more placeholders than arguments",
                    self.clause
                ))
            })?;
            rendered.push_str(&quote(arg));
        }

        if args.next().is_some() {
            return Err(Error::invalid_argument(format!(
                "clause '{}' has more arguments than placeholders",
                self.clause
            )));
        }

        let trimmed = rendered.trim();
        if trimmed.starts_with('(') && trimmed.ends_with(')') {
            Ok(trimmed.to_owned())
        } else {
            Ok(format!("({trimmed})"))
        }
    }
}

/// Quotes a value for a select expression, doubling embedded quotes.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Builder for select expressions.
///
/// The builder only accumulates clauses; [`Query::assemble`] renders them.
/// Field and collection names are written as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    fields: Vec<String>,
    from: Option<String>,
    conditions: Vec<Condition>,
    order: Option<(String, Direction)>,
    limit: Option<u32>,
}

impl Query {
    /// Creates an empty query, which selects every field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the projection. `*` selects every field.
    #[must_use]
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Sets the collection to read from. Only the first call takes effect.
    #[must_use]
    pub fn from(mut self, collection: impl Into<String>) -> Self {
        if self.from.is_none() {
            self.from = Some(collection.into());
        }
        self
    }

    /// Adds a condition joined with `and`. Each `?` in `clause` is replaced
    /// by the next argument, quoted.
    #[must_use]
    pub fn filter(self, clause: impl Into<String>, args: &[&str]) -> Self {
        self.push_condition(Connective::And, clause.into(), args)
    }

    /// Adds a condition joined with `or`.
    #[must_use]
    pub fn or_filter(self, clause: impl Into<String>, args: &[&str]) -> Self {
        self.push_condition(Connective::Or, clause.into(), args)
    }

    /// Restricts the query to the document with the given identifier.
    #[must_use]
    pub fn filter_id(self, id: &str) -> Self {
        self.filter("itemName() = ?", &[id])
    }

    /// Sorts by a field. Only the last call takes effect.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    /// Caps the number of rows. Only the last call takes effect.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn push_condition(mut self, connective: Connective, clause: String, args: &[&str]) -> Self {
        self.conditions.push(Condition {
            connective,
            clause,
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        });
        self
    }

    /// Renders the select expression. `collection` is used when no `from`
    /// was set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if no collection is known or a clause's
    /// placeholders do not match its arguments.
    pub fn assemble(&self, collection: &str) -> Result<String> {
        let from = self.from.as_deref().unwrap_or(collection);
        if from.is_empty() {
            return Err(Error::invalid_argument("query has no collection"));
        }

        let fields = if self.fields.is_empty() || self.fields.iter().any(|f| f == "*") {
            "*".to_owned()
        } else {
            self.fields.join(", ")
        };

        let mut expression = format!("select {fields} from {from}");

        for (index, condition) in self.conditions.iter().enumerate() {
            let rendered = condition.render()?;
            if index == 0 {
                expression.push_str(" where ");
            } else {
                expression.push(' ');
                expression.push_str(condition.connective.as_ref());
                expression.push(' ');
            }
            expression.push_str(&rendered);
        }

        if let Some((field, direction)) = &self.order {
            expression.push_str(&format!(" order by {field} {direction}"));
        }

        if let Some(limit) = self.limit {
            expression.push_str(&format!(" limit {limit}"));
        }

        Ok(expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_from_collection() {
        let query = Query::new().select("*").from("Orders");
        assert_eq!(query.assemble("Orders").unwrap(), "select * from Orders");
    }

    #[test]
    fn test_empty_projection_selects_all() {
        assert_eq!(Query::new().assemble("Orders").unwrap(), "select * from Orders");
    }

    #[test]
    fn test_from_first_call_wins() {
        let query = Query::new().from("a").from("b");
        assert_eq!(query.assemble("c").unwrap(), "select * from a");
    }

    #[test]
    fn test_projection_and_clauses() {
        let query = Query::new()
            .select("color")
            .select("size")
            .filter("color = ?", &["red"])
            .or_filter("(size = ? and note like ?)", &["M", "it's%"])
            .order_by("color", Direction::Desc)
            .limit(5);

        assert_eq!(
            query.assemble("Orders").unwrap(),
            "select color, size from Orders where (color = 'red') \
             or (size = 'M' and note like 'it''s%') order by color desc limit 5"
        );
    }

    #[test]
    fn test_filter_id() {
        let query = Query::new().filter_id("o-1").filter("size is not null", &[]);
        assert_eq!(
            query.assemble("Orders").unwrap(),
            "select * from Orders where (itemName() = 'o-1') and (size is not null)"
        );
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let query = Query::new().filter("a = ?", &["1"]).limit(1).limit(2);
        let first = query.assemble("d").unwrap();
        assert_eq!(first, query.assemble("d").unwrap());
        assert!(first.ends_with("limit 2"));
    }

    #[test]
    fn test_placeholder_mismatch() {
        let err = Query::new().filter("a = ? and b = ?", &["1"]).assemble("d").unwrap_err();
        assert!(err.is_invalid_argument());

        let err = Query::new().filter("a = ?", &["1", "2"]).assemble("d").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_missing_collection() {
        assert!(Query::new().assemble("").unwrap_err().is_invalid_argument());
    }
}
