//! `text/occi` rendering: text directives folded into one header per name.

/// Folds `Name: value` lines into one line per header name, values joined
/// with `", "` in first-seen order. Lines without a colon are dropped.
#[must_use]
pub fn fold(lines: &[String]) -> Vec<String> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => groups.push((name, vec![value])),
        }
    }
    groups
        .into_iter()
        .map(|(name, values)| format!("{name}: {}", values.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_join_under_their_header() {
        let lines = vec![
            "Category: a;class=\"kind\"".to_owned(),
            "X-OCCI-Attribute: x=1".to_owned(),
            "Category: b;class=\"mixin\"".to_owned(),
            "X-OCCI-Attribute: y=\"p, q\"".to_owned(),
        ];
        assert_eq!(
            fold(&lines),
            vec![
                "Category: a;class=\"kind\", b;class=\"mixin\"".to_owned(),
                "X-OCCI-Attribute: x=1, y=\"p, q\"".to_owned(),
            ]
        );
    }
}
