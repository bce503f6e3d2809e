//! Statement builder: expands list-valued named parameters into numbered
//! placeholders and normalizes parameter markers ahead of binding.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SqlShimError;
use crate::types::{ParamValue, SqlValue};

mod scanner;

pub(crate) use scanner::rewrite_named_placeholders;

lazy_static! {
    // Placeholder names are interpolated into the template verbatim, so they
    // must be plain identifiers, never caller data.
    static ref PARAM_NAME: Regex = Regex::new("^:?[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex");
}

/// A rewritten query template plus the scalar-only bindings for it.
///
/// Invariant: every named placeholder remaining in `sql` is expected to have
/// exactly one entry in `bindings`; mismatches surface as driver errors (or a
/// [`SqlShimError::ParameterError`]) at execution time.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedStatement {
    /// The rewritten query template.
    pub sql: String,
    /// Scalar bindings, names carrying the `:` marker.
    pub bindings: Vec<(String, SqlValue)>,
}

/// Normalize a parameter name by prefixing the `:` marker when absent.
///
/// # Errors
///
/// Returns [`SqlShimError::ParameterError`] when the name is not a plain
/// identifier.
pub fn normalize_name(name: &str) -> Result<String, SqlShimError> {
    if !PARAM_NAME.is_match(name) {
        return Err(SqlShimError::ParameterError(format!(
            "invalid parameter name: {name:?}"
        )));
    }
    if name.starts_with(':') {
        Ok(name.to_string())
    } else {
        Ok(format!(":{name}"))
    }
}

/// Build an executable statement from a template and named parameters.
///
/// Each list-valued entry of length N becomes N scalar bindings named
/// `<placeholder>_<index>`, and every occurrence of the original placeholder
/// in the template is replaced by the comma-joined new names. An empty list
/// becomes a single `<placeholder>_0` binding holding the empty string, which
/// keeps `IN (:p)` clauses syntactically valid. Scalar entries pass through
/// with their names normalized.
///
/// A fresh binding list is always built; the caller's parameters are never
/// mutated.
///
/// ```rust
/// use sql_shim::{ParamValue, expand_statement};
///
/// let expanded = expand_statement(
///     "SELECT * FROM t WHERE id IN (:ids)",
///     &[("ids".to_string(), ParamValue::from(vec![7i64, 9]))],
/// )?;
/// assert_eq!(expanded.sql, "SELECT * FROM t WHERE id IN (:ids_0,:ids_1)");
/// assert_eq!(expanded.bindings.len(), 2);
/// # Ok::<(), sql_shim::SqlShimError>(())
/// ```
///
/// # Errors
///
/// Returns [`SqlShimError::ParameterError`] for invalid parameter names or
/// two entries normalizing to the same placeholder.
pub fn expand_statement(
    sql: &str,
    values: &[(String, ParamValue)],
) -> Result<ExpandedStatement, SqlShimError> {
    let mut bindings: Vec<(String, SqlValue)> = Vec::with_capacity(values.len());
    let mut replacements: HashMap<String, String> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::with_capacity(values.len());

    for (name, value) in values {
        let placeholder = normalize_name(name)?;
        if !seen.insert(placeholder.clone()) {
            return Err(SqlShimError::ParameterError(format!(
                "duplicate parameter: {placeholder}"
            )));
        }
        match value {
            ParamValue::Scalar(scalar) => bindings.push((placeholder, scalar.clone())),
            ParamValue::List(items) => {
                let mut names = Vec::with_capacity(items.len().max(1));
                if items.is_empty() {
                    // Keep the placeholder list non-empty so the SQL stays valid.
                    let synthetic = format!("{placeholder}_0");
                    names.push(synthetic.clone());
                    bindings.push((synthetic, SqlValue::Text(String::new())));
                } else {
                    for (index, item) in items.iter().enumerate() {
                        let expanded = format!("{placeholder}_{index}");
                        names.push(expanded.clone());
                        bindings.push((expanded, item.clone()));
                    }
                }
                replacements.insert(placeholder, names.join(","));
            }
        }
    }

    let sql = if replacements.is_empty() {
        sql.to_string()
    } else {
        rewrite_named_placeholders(sql, |name| replacements.get(name).cloned())
    };

    Ok(ExpandedStatement { sql, bindings })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[i64]) -> ParamValue {
        ParamValue::from(values.to_vec())
    }

    #[test]
    fn expands_list_into_numbered_placeholders() {
        let expanded = expand_statement(
            "SELECT * FROM t WHERE id IN (:ids)",
            &[("ids".to_string(), list(&[4, 5, 6]))],
        )
        .unwrap();
        assert_eq!(expanded.sql, "SELECT * FROM t WHERE id IN (:ids_0,:ids_1,:ids_2)");
        assert_eq!(
            expanded.bindings,
            vec![
                (":ids_0".to_string(), SqlValue::Int(4)),
                (":ids_1".to_string(), SqlValue::Int(5)),
                (":ids_2".to_string(), SqlValue::Int(6)),
            ]
        );
    }

    #[test]
    fn empty_list_binds_one_empty_string() {
        let expanded = expand_statement(
            "SELECT * FROM t WHERE id IN (:ids)",
            &[("ids".to_string(), ParamValue::List(Vec::new()))],
        )
        .unwrap();
        assert_eq!(expanded.sql, "SELECT * FROM t WHERE id IN (:ids_0)");
        assert_eq!(
            expanded.bindings,
            vec![(":ids_0".to_string(), SqlValue::Text(String::new()))]
        );
    }

    #[test]
    fn marker_prefix_is_normalized() {
        let bare = expand_statement("SELECT :id", &[("id".to_string(), ParamValue::from(5i64))])
            .unwrap();
        let marked =
            expand_statement("SELECT :id", &[(":id".to_string(), ParamValue::from(5i64))])
                .unwrap();
        assert_eq!(bare, marked);
        assert_eq!(bare.bindings, vec![(":id".to_string(), SqlValue::Int(5))]);
    }

    #[test]
    fn scalars_leave_the_template_untouched() {
        let expanded = expand_statement(
            "SELECT * FROM t WHERE a = :a AND b = :b",
            &[
                ("a".to_string(), ParamValue::from("x")),
                ("b".to_string(), ParamValue::from(true)),
            ],
        )
        .unwrap();
        assert_eq!(expanded.sql, "SELECT * FROM t WHERE a = :a AND b = :b");
        assert_eq!(expanded.bindings.len(), 2);
    }

    #[test]
    fn prefix_collision_does_not_corrupt_longer_names() {
        let expanded = expand_statement(
            "SELECT * FROM t WHERE a = :id AND b IN (:ids) AND c IN (:id_list)",
            &[
                ("id".to_string(), list(&[1])),
                ("ids".to_string(), list(&[2, 3])),
                ("id_list".to_string(), list(&[4])),
            ],
        )
        .unwrap();
        assert_eq!(
            expanded.sql,
            "SELECT * FROM t WHERE a = :id_0 AND b IN (:ids_0,:ids_1) AND c IN (:id_list_0)"
        );
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let expanded = expand_statement(
            "SELECT :ids AS a, :ids AS b",
            &[("ids".to_string(), list(&[1, 2]))],
        )
        .unwrap();
        assert_eq!(expanded.sql, "SELECT :ids_0,:ids_1 AS a, :ids_0,:ids_1 AS b");
    }

    #[test]
    fn literals_and_comments_are_not_rewritten() {
        let expanded = expand_statement(
            "SELECT ':ids' AS lit, :ids -- :ids\nFROM t",
            &[("ids".to_string(), list(&[1]))],
        )
        .unwrap();
        assert_eq!(expanded.sql, "SELECT ':ids' AS lit, :ids_0 -- :ids\nFROM t");
    }

    #[test]
    fn invalid_name_is_rejected() {
        let err = expand_statement("SELECT 1", &[("bad name".to_string(), ParamValue::from(1i64))])
            .unwrap_err();
        assert!(matches!(err, SqlShimError::ParameterError(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = expand_statement(
            "SELECT :id",
            &[
                ("id".to_string(), ParamValue::from(1i64)),
                (":id".to_string(), ParamValue::from(2i64)),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SqlShimError::ParameterError(_)));
    }
}
