use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

const QUALIFIER: &str = r"(?:(?:about|around|approximately|approx\.|roughly|nearly|almost|just\s+over|just\s+under|over|under|some|fewer\s+than|less\s+than|more\s+than|up\s+to|an\s+estimated|c\.|ca\.|~)\s*)?";
const NUMBER: &str = r"(?P<number>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";
const UNIT: &str = r"(?:\s*(?P<unit>thousands?|millions?|billions?|bn|k|m)\b)?";

// {q} qualifier, {n} number literal, {u} optional unit suffix.
const PATTERN_TEMPLATES: [&str; 6] = [
    r"estimated\s+(?:(?:total|global|wild|world)\s+)?population(?:\s+(?:size|is|was|of|at|stands|numbers?|currently|now|around))*\s*:?\s*{q}{n}{u}",
    r"population\s+(?:is\s+|was\s+|has\s+been\s+)?estimated\s+(?:to\s+be\s+|at\s+)?{q}{n}{u}",
    r"population(?:\s+(?:size|is|was|of|at|stands|numbers?|totals?|currently|now))*\s*:?\s*{q}{n}{u}",
    r"{q}{n}{u}\s+(?:(?:mature|adult|wild|breeding|living|remaining)\s+)*individuals",
    r"{q}{n}{u}\s+(?:\w+\s+){0,2}remain(?:ing|s)?\b",
    r"remaining(?:\s+(?:wild\s+)?(?:population|number))?(?:\s+(?:is|was|of|at|stands))*\s*:?\s*{q}{n}{u}",
];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PATTERN_TEMPLATES
            .iter()
            .filter_map(|template| {
                let source = template
                    .replace("{q}", QUALIFIER)
                    .replace("{n}", NUMBER)
                    .replace("{u}", UNIT);
                match RegexBuilder::new(&source).case_insensitive(true).build() {
                    Ok(regex) => Some(regex),
                    Err(error) => {
                        tracing::warn!(%error, "skipping invalid population pattern");
                        None
                    }
                }
            })
            .collect()
    })
}

pub fn extract_population(text: Option<&str>) -> Option<u64> {
    let text = text?;
    if text.trim().is_empty() {
        return None;
    }

    patterns().iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        let number = captures.name("number")?.as_str();
        let unit = captures.name("unit").map(|unit| unit.as_str());
        scaled_count(number, unit)
    })
}

fn scaled_count(number: &str, unit: Option<&str>) -> Option<u64> {
    let value: f64 = number.replace(',', "").parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let scaled = (value * unit_multiplier(unit)).round();
    if scaled <= 0.0 || scaled >= u64::MAX as f64 {
        return None;
    }

    Some(scaled as u64)
}

fn unit_multiplier(unit: Option<&str>) -> f64 {
    match unit.map(str::to_ascii_lowercase).as_deref() {
        Some("thousand" | "thousands" | "k") => 1e3,
        Some("million" | "millions" | "m") => 1e6,
        Some("billion" | "billions" | "bn") => 1e9,
        _ => 1.0,
    }
}
