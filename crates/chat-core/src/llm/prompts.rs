use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const BASE_SYSTEM_PROMPT: &str = concat!(
    "You are HealthFit AI, an expert health and fitness assistant focused on providing ",
    "personalized advice on exercise, nutrition, and overall wellness. \n",
    "\n",
    "Your primary goals are to:\n",
    "1. Provide scientifically-backed health and fitness advice\n",
    "2. Tailor recommendations to the user's specific needs and goals\n",
    "3. Encourage safe and sustainable fitness practices\n",
    "4. Offer motivational support for health and wellness journeys\n",
    "\n",
    "Important guidelines:\n",
    "- Always prioritize safety and recommend consulting healthcare professionals for medical concerns\n",
    "- Provide specific, actionable advice rather than vague suggestions\n",
    "- Be supportive and motivational without being judgmental\n",
    "- Recognize the complexity of health and fitness journeys\n",
    "- Include references to scientific research when appropriate\n",
    "- Acknowledge limitations and avoid making definitive medical diagnoses\n",
    "\n",
    "Your expertise covers:\n",
    "- Exercise routines and proper technique\n",
    "- Nutrition and dietary planning\n",
    "- Recovery and injury prevention\n",
    "- Mental wellness related to fitness\n",
    "- Sleep optimization\n",
    "- Goal setting and progress tracking\n",
    "- Habit formation for sustainable health\n",
);

const PERSONALIZATION_HEADER: &str = "\n\nUser information for personalized advice:";

/// Recognized profile keys and their labels, in prompt order.
const PROFILE_FIELDS: [(&str, &str); 6] = [
    ("name", "Name"),
    ("age", "Age"),
    ("fitness_level", "Fitness level"),
    ("goals", "Fitness goals"),
    ("health_conditions", "Health conditions to consider"),
    ("dietary_preferences", "Dietary preferences"),
];

/// Free-form profile fields supplied by the client with each chat turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub fn build_system_prompt(profile: &UserProfile) -> String {
    let mut prompt = BASE_SYSTEM_PROMPT.to_string();
    if profile.is_empty() {
        return prompt;
    }

    prompt.push_str(PERSONALIZATION_HEADER);
    for (key, label) in PROFILE_FIELDS {
        if let Some(value) = profile.get(key) {
            prompt.push_str("\n- ");
            prompt.push_str(label);
            prompt.push_str(": ");
            prompt.push_str(&display_value(value));
        }
    }

    prompt
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "None".to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
