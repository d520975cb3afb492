use pgmatch_core::{ConstraintKind, FkAction, FkMatchType};

pub fn constraint_kind_from_code(code: &str) -> ConstraintKind {
    match code {
        "c" => ConstraintKind::Check,
        "f" => ConstraintKind::ForeignKey,
        "p" => ConstraintKind::PrimaryKey,
        "u" => ConstraintKind::Unique,
        "t" => ConstraintKind::Trigger,
        "x" => ConstraintKind::Exclusion,
        "n" => ConstraintKind::NotNull,
        other => ConstraintKind::Other(other.to_string()),
    }
}

/// Decode `confupdtype`/`confdeltype`. A blank code means "not a foreign key".
pub fn fk_action_from_code(code: &str) -> Option<FkAction> {
    match code.trim() {
        "" => None,
        "a" => Some(FkAction::NoAction),
        "r" => Some(FkAction::Restrict),
        "c" => Some(FkAction::Cascade),
        "n" => Some(FkAction::SetNull),
        "d" => Some(FkAction::SetDefault),
        _ => Some(FkAction::Unknown),
    }
}

pub fn fk_match_from_code(code: &str) -> Option<FkMatchType> {
    match code.trim() {
        "" => None,
        "f" => Some(FkMatchType::Full),
        "p" => Some(FkMatchType::Partial),
        "s" => Some(FkMatchType::Simple),
        _ => Some(FkMatchType::Unknown),
    }
}

/// information_schema reports booleans as `YES`/`NO`.
pub fn yes_no(value: Option<&str>) -> bool {
    matches!(value, Some(text) if text.eq_ignore_ascii_case("YES"))
}

/// `is_generated` is `ALWAYS` for generated columns and `NEVER` otherwise.
pub fn generated_from_text(value: Option<&str>) -> bool {
    matches!(value, Some(text) if text.eq_ignore_ascii_case("ALWAYS"))
}
