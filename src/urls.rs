/// Resolve a step's target URL against the configured base address.
///
/// Targets carrying an explicit scheme pass through untouched. Relative
/// targets are joined to the base with exactly one separating slash. An
/// empty target means the base itself.
pub fn resolve(base: &str, target: &str) -> String {
    if target.is_empty() {
        return base.to_string();
    }
    if has_scheme(target) {
        return target.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        target.trim_start_matches('/')
    )
}

fn has_scheme(target: &str) -> bool {
    match target.find("://") {
        Some(pos) if pos > 0 => {
            let scheme = &target[..pos];
            scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
