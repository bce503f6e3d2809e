/// Build the named-parameter list for a query.
///
/// Each value goes through `ParamValue::from`, so scalars and `Vec`s of
/// scalars both work; a `Vec` becomes a list parameter that the statement
/// builder expands:
/// ```rust
/// use sql_shim::params;
///
/// let values = params!(
///     "id" => 5i64,
///     "active" => true,
///     "names" => vec!["alice", "bob"],
/// );
/// assert_eq!(values.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::ParamValue)>::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        ::std::vec![
            $( (::std::string::ToString::to_string(&$name), $crate::ParamValue::from($value)) ),+
        ]
    };
}
