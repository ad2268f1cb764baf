//! Parsing of method signature texts.
//!
//! Two forms are accepted:
//!
//! * **Selector:** `subtractWithMinuend:subtrahend:completion:`. Every `:` closes one argument
//!   label, the first label also carries the method name.
//! * **Call:** `subtract(minuend:subtrahend:completion:)`. The method name comes before the
//!   parentheses, `_` marks an anonymous label.
use crate::proxy::ParameterStructure;

/// Separates the method name from the first parameter name in the leading selector label.
const NAME_SEPARATOR: &str = "With";

/// The method name and argument labels read from a signature, completion included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedSignature {
    pub name: String,
    pub labels: Vec<Option<String>>,
}

/// Reads `signature` following the naming convention of `structure`.
///
/// Labels are only meaningful for [`ParameterStructure::ByName`], by-position signatures
/// always yield anonymous labels.
pub(crate) fn parse(
    signature: &str,
    structure: ParameterStructure,
) -> Result<ParsedSignature, String> {
    if signature.chars().any(char::is_whitespace) {
        return Err("whitespace is not allowed".to_string());
    }

    let parsed = match signature.find('(') {
        Some(open) => parse_call(&signature[..open], &signature[open + 1..])?,
        None => parse_selector(signature, structure)?,
    };

    if parsed.name.is_empty() {
        return Err("the method name is empty".to_string());
    }

    match structure {
        ParameterStructure::ByName => Ok(parsed),
        ParameterStructure::ByPosition => Ok(ParsedSignature {
            labels: vec![None; parsed.labels.len()],
            ..parsed
        }),
    }
}

fn parse_call(name: &str, rest: &str) -> Result<ParsedSignature, String> {
    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| "missing closing parenthesis".to_string())?;

    if name.contains(':') || inner.contains(['(', ')']) {
        return Err("unexpected character in call signature".to_string());
    }

    let labels = split_labels(inner)?
        .into_iter()
        .map(|label| (label != "_").then_some(label))
        .collect();

    Ok(ParsedSignature {
        name: name.to_string(),
        labels,
    })
}

fn parse_selector(
    signature: &str,
    structure: ParameterStructure,
) -> Result<ParsedSignature, String> {
    if !signature.contains(':') {
        return Ok(ParsedSignature {
            name: signature.to_string(),
            labels: vec![],
        });
    }
    if signature.contains(')') {
        return Err("unexpected character in selector".to_string());
    }

    let mut labels = split_labels(signature)?.into_iter();
    let head = labels.next().unwrap_or_default();
    let rest = labels.map(|label| (!label.is_empty()).then_some(label));

    let (name, first) = match structure {
        ParameterStructure::ByName => split_head(&head),
        ParameterStructure::ByPosition => (head, None),
    };

    Ok(ParsedSignature {
        name,
        labels: std::iter::once(first).chain(rest).collect(),
    })
}

/// Splits `a:b:c:` into `["a", "b", "c"]`. The text must end with `:` unless it is empty.
fn split_labels(text: &str) -> Result<Vec<String>, String> {
    if text.is_empty() {
        return Ok(vec![]);
    }
    let body = text
        .strip_suffix(':')
        .ok_or_else(|| format!("label '{text}' is not terminated by ':'"))?;
    Ok(body.split(':').map(str::to_string).collect())
}

/// Splits `subtractWithMinuend` into `("subtract", Some("minuend"))`.
///
/// `With` only separates when followed by an uppercase letter, so `getWithdrawals` stays a
/// method name.
fn split_head(head: &str) -> (String, Option<String>) {
    let split = head.match_indices(NAME_SEPARATOR).find_map(|(index, _)| {
        let rest = &head[index + NAME_SEPARATOR.len()..];
        rest.starts_with(|c: char| c.is_uppercase())
            .then(|| (&head[..index], rest))
    });

    match split {
        Some((name, rest)) => (name.to_string(), Some(lowercase_first(rest))),
        None => (head.to_string(), None),
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[Option<&str>]) -> Vec<Option<String>> {
        names.iter().map(|n| n.map(str::to_string)).collect()
    }

    #[test]
    fn by_name_selector_splits_method_from_first_param() {
        let parsed = parse(
            "subtractWithMinuend:subtrahend:completion:",
            ParameterStructure::ByName,
        )
        .unwrap();

        assert_eq!(parsed.name, "subtract");
        assert_eq!(
            parsed.labels,
            labels(&[Some("minuend"), Some("subtrahend"), Some("completion")])
        );
    }

    #[test]
    fn completion_only_selector() {
        let parsed = parse("pingWithCompletion:", ParameterStructure::ByName).unwrap();
        assert_eq!(parsed.name, "ping");
        assert_eq!(parsed.labels, labels(&[Some("completion")]));

        let parsed = parse("ping:", ParameterStructure::ByName).unwrap();
        assert_eq!(parsed.name, "ping");
        assert_eq!(parsed.labels, labels(&[None]));
    }

    #[test]
    fn with_needs_an_uppercase_follower() {
        let parsed = parse(
            "getWithdrawalsWithAccount:completion:",
            ParameterStructure::ByName,
        )
        .unwrap();
        assert_eq!(parsed.name, "getWithdrawals");
        assert_eq!(parsed.labels, labels(&[Some("account"), Some("completion")]));
    }

    #[test]
    fn by_position_selector_keeps_the_leading_label_verbatim() {
        let parsed = parse("subtractWithMinuend:::", ParameterStructure::ByPosition).unwrap();
        assert_eq!(parsed.name, "subtractWithMinuend");
        assert_eq!(parsed.labels, labels(&[None, None, None]));
    }

    #[test]
    fn call_form() {
        let parsed = parse(
            "generateIntegers(apiKey:n:completion:)",
            ParameterStructure::ByName,
        )
        .unwrap();
        assert_eq!(parsed.name, "generateIntegers");
        assert_eq!(
            parsed.labels,
            labels(&[Some("apiKey"), Some("n"), Some("completion")])
        );

        let parsed = parse("agents.list(_:_:)", ParameterStructure::ByName).unwrap();
        assert_eq!(parsed.name, "agents.list");
        assert_eq!(parsed.labels, labels(&[None, None]));

        let parsed = parse("ping()", ParameterStructure::ByPosition).unwrap();
        assert!(parsed.labels.is_empty());
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        for signature in [
            "",
            "(a:completion:)",
            "sum(a:completion:",
            "sum(a:completion)",
            "sum(a b:)",
            ":completion:",
            "sum:a)",
        ] {
            assert!(
                parse(signature, ParameterStructure::ByName).is_err(),
                "'{signature}' should be rejected"
            );
        }
    }
}
