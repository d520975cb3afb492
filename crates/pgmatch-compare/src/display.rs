use std::fmt::Display;

/// Render an optional catalog value; absent values print as `NULL`.
pub(crate) fn opt<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "NULL".to_string(), |value| value.to_string())
}

/// Render attribute positions the way Postgres prints an int2 array.
pub(crate) fn positions(values: &[i16]) -> String {
    let joined: Vec<String> = values.iter().map(i16::to_string).collect();
    format!("{{{}}}", joined.join(","))
}

pub(crate) fn opt_positions(values: Option<&[i16]>) -> String {
    values.map_or_else(|| "NULL".to_string(), positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_like_psql() {
        assert_eq!(opt(Some(2)), "2");
        assert_eq!(opt::<i32>(None), "NULL");
        assert_eq!(positions(&[1, 3]), "{1,3}");
        assert_eq!(opt_positions(None), "NULL");
    }
}
