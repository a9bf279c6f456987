use crate::catalog::{IntentCatalog, IntentDefinition};

/// First intent, in catalog order, with a keyword occurring anywhere in `text`.
pub fn classify_intent_keywords<'a>(
    catalog: &'a IntentCatalog,
    text: &str,
) -> Option<&'a IntentDefinition> {
    let lower = text.to_lowercase();

    catalog
        .iter()
        .find(|intent| contains_any(&lower, &intent.keywords))
}

fn contains_any(input: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| input.contains(needle.as_str()))
}
