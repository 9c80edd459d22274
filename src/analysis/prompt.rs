use super::types::{ChatMessage, ProfileSnapshot};

/// Task description and output contract. Kept verbatim so prompt tweaks
/// stay reviewable as plain text.
const TASK_AND_FORMAT: &str = r#"TASK: Analyze this food description with expert nutrition knowledge. Make intelligent, specific assumptions about:
- Exact portion sizes (with weights/measurements)
- Specific brands (especially popular ones like Chobani, Dannon, etc.)
- Cooking methods and hidden ingredients (oils, seasonings, etc.)
- Preparation details that affect nutrition

Respond in this EXACT JSON format (no markdown, just JSON):
{
  "response": "Conversational response explaining your analysis",
  "meal": {
    "name": "Specific meal name",
    "calories": number,
    "protein": number,
    "carbs": number,
    "fats": number,
    "confidence": 0.0-1.0,
    "assumptions": [
      "Specific assumption with brand/quantity (e.g., 'Assuming 1 cup (227g) Chobani Plain Nonfat Greek Yogurt')",
      "Another specific assumption with reasoning",
      "Include cooking oils, seasonings, preparation methods"
    ],
    "sources": [
      {
        "name": "USDA FoodData Central",
        "description": "Nutritional data for plain nonfat Greek yogurt",
        "url": "https://fdc.nal.usda.gov/fdc-app.html#/food-details/171265/nutrients",
        "note": "Based on training data knowledge - not real-time lookup"
      }
    ],
    "ingredients": [
      {
        "name": "Specific ingredient name",
        "amount": number,
        "unit": "cup/oz/grams/etc",
        "nutrition": {"calories": 0, "protein": 0, "carbs": 0, "fats": 0},
        "inferred": false
      }
    ]
  }
}

Make your assumptions HIGHLY SPECIFIC and ACTIONABLE. Instead of "average portion" say "1 cup (227g)". Instead of "cooking oil" say "1 tsp olive oil". Be the nutrition expert users need!"#;

/// Renders the single-turn instruction: persona, profile snapshot, the last
/// four turns of history, the current input, and the output contract.
pub fn build_nutrition_prompt(
    user_input: &str,
    history: &[ChatMessage],
    profile: &ProfileSnapshot,
) -> String {
    let recent_history = history
        .iter()
        .rev()
        .take(4)
        .rev()
        .map(|msg| format!("{}: {}", msg.role.as_str(), msg.content))
        .collect::<Vec<_>>()
        .join("\n");

    let brands = if profile.favorite_brands.is_empty() {
        "Unknown".to_string()
    } else {
        profile.favorite_brands.join(", ")
    };

    let recent_meals = {
        let names: Vec<&str> = profile
            .recent_meals
            .iter()
            .rev()
            .take(3)
            .rev()
            .map(|m| m.name.as_str())
            .collect();
        if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        }
    };

    let dietary = if profile.dietary_preferences.is_empty() {
        "None specified".to_string()
    } else {
        profile.dietary_preferences.join(", ")
    };

    let mut prompt = format!(
        r#"You are Master Shredder, an expert nutrition assistant. You have deep knowledge of nutrition, brands, cooking methods, and food preparation. You help users track their food intake with intelligent, specific analysis.

USER PROFILE:
- Favorite brands: {brands}
- Recent meals: {recent_meals}
- Dietary preferences: {dietary}

CONVERSATION HISTORY:
{recent_history}

CURRENT USER INPUT: "{user_input}"

"#
    );
    prompt.push_str(TASK_AND_FORMAT);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{ChatRole, RecentMeal};

    fn msg(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn embeds_the_quoted_user_input_and_output_contract() {
        let prompt = build_nutrition_prompt("2 eggs and toast", &[], &ProfileSnapshot::default());
        assert!(prompt.contains("CURRENT USER INPUT: \"2 eggs and toast\""));
        assert!(prompt.contains("EXACT JSON format"));
        assert!(prompt.contains("Master Shredder"));
    }

    #[test]
    fn empty_profile_renders_fallback_text() {
        let prompt = build_nutrition_prompt("pizza", &[], &ProfileSnapshot::default());
        assert!(prompt.contains("- Favorite brands: Unknown"));
        assert!(prompt.contains("- Recent meals: None"));
        assert!(prompt.contains("- Dietary preferences: None specified"));
    }

    #[test]
    fn keeps_only_the_last_four_history_turns() {
        let history = vec![
            msg(ChatRole::User, "one"),
            msg(ChatRole::Assistant, "two"),
            msg(ChatRole::User, "three"),
            msg(ChatRole::Assistant, "four"),
            msg(ChatRole::User, "five"),
        ];
        let prompt = build_nutrition_prompt("lunch", &history, &ProfileSnapshot::default());
        assert!(!prompt.contains("user: one"));
        assert!(prompt.contains("assistant: two"));
        assert!(prompt.contains("user: five"));
    }

    #[test]
    fn renders_the_last_three_recent_meals_in_order() {
        let profile = ProfileSnapshot {
            favorite_brands: vec!["Chobani".into()],
            recent_meals: ["a", "b", "c", "d"]
                .iter()
                .map(|n| RecentMeal {
                    name: n.to_string(),
                })
                .collect(),
            dietary_preferences: vec!["vegetarian".into()],
        };
        let prompt = build_nutrition_prompt("salad", &[], &profile);
        assert!(prompt.contains("- Recent meals: b, c, d"));
        assert!(prompt.contains("- Favorite brands: Chobani"));
        assert!(prompt.contains("- Dietary preferences: vegetarian"));
    }
}
