use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// One unit-detection rule: a substring predicate over the raw text and a
/// conversion over the numeric values found in it, in order of appearance.
struct UnitRule {
    unit: &'static str,
    applies: fn(&str) -> bool,
    convert: fn(&[f64]) -> Option<f64>,
}

/// Unit rules in precedence order. `kg` must win over the bare-`g` rule and
/// over multipacks like "2 x 1kg"; the multipack rule must win over `g`.
static UNIT_RULES: &[UnitRule] = &[
    UnitRule {
        unit: "kg",
        applies: |s| s.contains("kg"),
        convert: |values| values.first().copied(),
    },
    UnitRule {
        unit: "x..g",
        applies: |s| s.contains('x') && s.contains('g'),
        convert: |values| match values {
            [count, unit_weight, ..] => Some(count * unit_weight / 1000.0),
            _ => None,
        },
    },
    UnitRule {
        unit: "ml",
        applies: |s| s.contains("ml"),
        convert: |values| values.first().map(|v| v / 1000.0),
    },
    UnitRule {
        unit: "oz",
        applies: |s| s.contains("oz"),
        convert: |values| values.first().map(|v| v * 28.35 / 1000.0),
    },
    UnitRule {
        unit: "g",
        applies: |s| s.contains('g'),
        convert: |values| values.first().map(|v| v / 1000.0),
    },
];

/// Parse a free-text weight description into kilograms.
///
/// A bare numeric string is taken to be kilograms already; otherwise the
/// first matching unit rule converts the numeric values extracted from the
/// text. Millilitres are converted at 1 ml ~ 1 g. Returns `None` when no
/// number is present or no rule matches; callers drop such rows.
pub fn to_kilograms(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }

    let values: Vec<f64> = NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if values.is_empty() {
        return None;
    }

    let rule = UNIT_RULES.iter().find(|rule| (rule.applies)(text))?;
    let kilograms = (rule.convert)(&values)?;
    tracing::trace!(unit = rule.unit, raw = text, kilograms, "weight converted");
    Some(kilograms)
}
