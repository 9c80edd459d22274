use tracing::debug;

use super::types::NutritionAnalysis;

/// Finds the first balanced top-level JSON object in free-form model
/// output. The model is told to answer with bare JSON but routinely wraps
/// it in prose or markdown fences.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decodes a model reply into an analysis. A reply with no extractable
/// JSON, or JSON that does not match the expected shape, degrades to plain
/// conversational text with no structured meal; it is never an error.
pub fn parse_model_reply(content: &str) -> NutritionAnalysis {
    if let Some(raw) = extract_json_object(content) {
        match serde_json::from_str::<NutritionAnalysis>(raw) {
            Ok(analysis) => return analysis,
            Err(e) => debug!(error = %e, "model reply JSON did not match the expected shape"),
        }
    }
    NutritionAnalysis {
        response: content.to_string(),
        meal: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEAL_JSON: &str = r#"{
        "response": "Here you go!",
        "meal": {
            "name": "2 Scrambled Eggs",
            "calories": 174,
            "protein": 12,
            "carbs": 2,
            "fats": 14,
            "confidence": 0.9,
            "assumptions": ["Assuming 2 large eggs", "1 tsp butter for cooking"],
            "ingredients": [
                {
                    "name": "Large Eggs",
                    "amount": 2,
                    "unit": "piece",
                    "nutrition": {"calories": 140, "protein": 12, "carbs": 2, "fats": 10},
                    "inferred": false
                }
            ]
        }
    }"#;

    #[test]
    fn parses_bare_json() {
        let analysis = parse_model_reply(MEAL_JSON);
        assert_eq!(analysis.response, "Here you go!");
        let meal = analysis.meal.expect("meal");
        assert_eq!(meal.name, "2 Scrambled Eggs");
        assert_eq!(meal.calories, 174.0);
        assert_eq!(meal.assumptions.len(), 2);
        assert_eq!(meal.ingredients.len(), 1);
        assert!(!meal.ingredients[0].inferred);
    }

    #[test]
    fn ignores_markdown_fences_and_surrounding_prose() {
        let wrapped = format!("Sure! ```json\n{MEAL_JSON}\n``` Enjoy!");
        let analysis = parse_model_reply(&wrapped);
        let meal = analysis.meal.expect("meal");
        assert_eq!(meal.protein, 12.0);
        assert_eq!(analysis.response, "Here you go!");
    }

    #[test]
    fn reply_without_braces_degrades_to_plain_text() {
        let text = "Could you tell me more about the portion size?";
        let analysis = parse_model_reply(text);
        assert_eq!(analysis.response, text);
        assert!(analysis.meal.is_none());
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_extraction() {
        let text = r#"note {"response": "curly {brace} inside", "meal": null} done"#;
        let analysis = parse_model_reply(text);
        assert_eq!(analysis.response, "curly {brace} inside");
        assert!(analysis.meal.is_none());
    }

    #[test]
    fn unbalanced_json_degrades_to_plain_text() {
        let text = r#"so close: {"response": "oops"#;
        let analysis = parse_model_reply(text);
        assert_eq!(analysis.response, text);
        assert!(analysis.meal.is_none());
    }

    #[test]
    fn object_of_the_wrong_shape_degrades_to_plain_text() {
        let text = r#"{"foo": 1}"#;
        let analysis = parse_model_reply(text);
        assert_eq!(analysis.response, text);
        assert!(analysis.meal.is_none());
    }
}
