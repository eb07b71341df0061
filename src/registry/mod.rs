//! Static catalog of the hosted models the studio can talk to
//!
//! Each model is tagged with the capability category that decides which
//! session controller and request shape apply to it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability category of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chat,
    Code,
    Image,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chat => "chat",
            Category::Code => "code",
            Category::Image => "image",
        }
    }

    pub fn all() -> [Category; 3] {
        [Category::Chat, Category::Code, Category::Image]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hosted model entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    /// Provider model identifier, unique across the catalog
    pub id: &'static str,
    /// Human readable name
    pub display_name: &'static str,
    pub category: Category,
    pub description: &'static str,
}

/// Category used when the selected model does not resolve
pub const DEFAULT_CATEGORY: Category = Category::Chat;

/// Model selected when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "mistral-7b-instruct";

const CATALOG: &[Model] = &[
    Model {
        id: "mistral-7b-instruct",
        display_name: "Mistral 7B Instruct",
        category: Category::Chat,
        description: "General purpose chat model",
    },
    Model {
        id: "codellama-34b-instruct",
        display_name: "CodeLlama 34B",
        category: Category::Code,
        description: "Code generation and assistance",
    },
    Model {
        id: "llama-3.1-8b-instruct",
        display_name: "Llama 3.1 8B",
        category: Category::Chat,
        description: "Advanced conversational AI",
    },
    Model {
        id: "stable-diffusion-xl",
        display_name: "Stable Diffusion XL",
        category: Category::Image,
        description: "High-quality image generation",
    },
    Model {
        id: "deepseek-coder-33b",
        display_name: "DeepSeek Coder",
        category: Category::Code,
        description: "Specialized coding assistant",
    },
    Model {
        id: "nous-hermes-2-mixtral",
        display_name: "Nous Hermes 2",
        category: Category::Chat,
        description: "Intelligent conversation model",
    },
];

/// Target languages offered by the code assistant
pub const CODE_LANGUAGES: &[&str] = &[
    "javascript",
    "python",
    "java",
    "cpp",
    "csharp",
    "go",
    "rust",
    "php",
    "ruby",
    "swift",
];

/// Language selected for code generation by default
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

/// Check whether a language is one the code assistant offers
pub fn is_known_language(language: &str) -> bool {
    CODE_LANGUAGES.contains(&language)
}

/// File extension used when saving generated code
pub fn language_extension(language: &str) -> &'static str {
    match language {
        "javascript" => "js",
        "python" => "py",
        "java" => "java",
        "cpp" => "cpp",
        "csharp" => "cs",
        "go" => "go",
        "rust" => "rs",
        "php" => "php",
        "ruby" => "rb",
        "swift" => "swift",
        _ => "txt",
    }
}

/// Read-only view over the model catalog
#[derive(Debug, Clone, Copy)]
pub struct ModelRegistry {
    models: &'static [Model],
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { models: CATALOG }
    }

    /// All models, in catalog order
    pub fn list(&self) -> &'static [Model] {
        self.models
    }

    pub fn find(&self, id: &str) -> Option<&'static Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Category of the selected model, falling back to [`DEFAULT_CATEGORY`]
    pub fn category_of(&self, selected_id: &str) -> Category {
        self.find(selected_id)
            .map(|m| m.category)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn default_model(&self) -> &'static Model {
        self.find(DEFAULT_MODEL_ID).unwrap_or(&self.models[0])
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &'static Model> {
        self.models.iter().filter(move |m| m.category == category)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_find_round_trips_every_model() {
        let registry = ModelRegistry::new();
        for model in registry.list() {
            assert_eq!(registry.find(model.id), Some(model));
        }
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let registry = ModelRegistry::new();
        let ids: HashSet<_> = registry.list().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), registry.list().len());
        assert!(!registry.list().is_empty());
    }

    #[test]
    fn test_unknown_model_falls_back_to_chat() {
        let registry = ModelRegistry::new();
        assert!(registry.find("gpt-nonexistent").is_none());
        assert_eq!(registry.category_of("gpt-nonexistent"), Category::Chat);
        assert_eq!(registry.category_of("stable-diffusion-xl"), Category::Image);
        assert_eq!(registry.category_of("deepseek-coder-33b"), Category::Code);
    }

    #[test]
    fn test_default_model() {
        let registry = ModelRegistry::new();
        assert_eq!(registry.default_model().id, "mistral-7b-instruct");
        assert_eq!(registry.default_model().category, Category::Chat);
    }

    #[test]
    fn test_languages() {
        assert!(is_known_language("rust"));
        assert!(!is_known_language("cobol"));
        assert!(is_known_language(DEFAULT_CODE_LANGUAGE));
        for language in CODE_LANGUAGES {
            assert_ne!(language_extension(language), "txt");
        }
    }
}
