//! Keyword heuristic for suggesting an issue category.
//!
//! This is a fixed rule table, not a learned model: the text is lower-cased
//! and checked against each keyword group in priority order, and the first
//! group with any hit decides the category.

use common::entities::issue::Category;

const RULES: [(Category, &[&str]); 4] = [
    (Category::Garbage, &["garbage", "trash", "waste"]),
    (Category::Pothole, &["pothole", "road", "street damage"]),
    (Category::Lighting, &["light", "lamp", "dark"]),
    (Category::Safety, &["danger", "unsafe", "security"]),
];

pub fn suggest_category(text: &str) -> Category {
    let text = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}
