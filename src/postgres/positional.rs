use std::collections::HashMap;

use crate::error::SqlShimError;
use crate::expansion::{ExpandedStatement, rewrite_named_placeholders};
use crate::types::SqlValue;

/// Rewrite named placeholders to the `$N` form the driver understands and
/// order the bound values accordingly.
///
/// Indices are assigned in order of first appearance; repeated occurrences of
/// one placeholder share an index. A placeholder without a binding, or a
/// binding the statement never references, is a `ParameterError`.
pub(crate) fn to_positional(
    statement: &ExpandedStatement,
) -> Result<(String, Vec<SqlValue>), SqlShimError> {
    let values_by_name: HashMap<&str, &SqlValue> = statement
        .bindings
        .iter()
        .map(|(name, value)| (name.as_str(), value))
        .collect();

    let mut assigned: HashMap<String, usize> = HashMap::new();
    let mut ordered: Vec<SqlValue> = Vec::with_capacity(statement.bindings.len());
    let mut missing: Option<String> = None;

    let sql = rewrite_named_placeholders(&statement.sql, |name| {
        if let Some(&index) = assigned.get(name) {
            return Some(format!("${index}"));
        }
        match values_by_name.get(name) {
            Some(value) => {
                let index = ordered.len() + 1;
                ordered.push((*value).clone());
                assigned.insert(name.to_string(), index);
                Some(format!("${index}"))
            }
            None => {
                missing.get_or_insert_with(|| name.to_string());
                None
            }
        }
    });

    if let Some(name) = missing {
        return Err(SqlShimError::ParameterError(format!(
            "no value bound for placeholder {name}"
        )));
    }
    if assigned.len() != statement.bindings.len() {
        let unused = statement
            .bindings
            .iter()
            .map(|(name, _)| name)
            .find(|name| !assigned.contains_key(name.as_str()))
            .cloned()
            .unwrap_or_default();
        return Err(SqlShimError::ParameterError(format!(
            "placeholder {unused} is not present in the statement"
        )));
    }

    Ok((sql, ordered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::expand_statement;
    use crate::types::ParamValue;

    fn expanded(sql: &str, values: &[(&str, ParamValue)]) -> ExpandedStatement {
        let owned: Vec<(String, ParamValue)> = values
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        expand_statement(sql, &owned).unwrap()
    }

    #[test]
    fn assigns_indices_in_order_of_appearance() {
        let statement = expanded(
            "SELECT * FROM t WHERE a = :a AND b = :b",
            &[("b", ParamValue::from(2i64)), ("a", ParamValue::from(1i64))],
        );
        let (sql, values) = to_positional(&statement).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
        assert_eq!(values, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn repeated_placeholder_shares_an_index() {
        let statement = expanded(
            "SELECT :a, :a, :b",
            &[("a", ParamValue::from(1i64)), ("b", ParamValue::from(2i64))],
        );
        let (sql, values) = to_positional(&statement).unwrap();
        assert_eq!(sql, "SELECT $1, $1, $2");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn expanded_lists_become_numbered_positionals() {
        let statement = expanded(
            "SELECT * FROM t WHERE id IN (:ids)",
            &[("ids", ParamValue::from(vec![7i64, 8, 9]))],
        );
        let (sql, values) = to_positional(&statement).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE id IN ($1,$2,$3)");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn casts_are_preserved() {
        let statement = expanded("SELECT :id::int", &[("id", ParamValue::from(5i64))]);
        let (sql, _) = to_positional(&statement).unwrap();
        assert_eq!(sql, "SELECT $1::int");
    }

    #[test]
    fn missing_binding_is_an_error() {
        let statement = expanded("SELECT :a, :b", &[("a", ParamValue::from(1i64))]);
        let err = to_positional(&statement).unwrap_err();
        assert!(matches!(err, SqlShimError::ParameterError(_)));
    }

    #[test]
    fn unused_binding_is_an_error() {
        let statement = expanded(
            "SELECT :a",
            &[("a", ParamValue::from(1i64)), ("b", ParamValue::from(2i64))],
        );
        let err = to_positional(&statement).unwrap_err();
        assert!(matches!(err, SqlShimError::ParameterError(_)));
    }
}
