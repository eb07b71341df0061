//! Terminal theme and color definitions

use crate::registry::Category;
use crossterm::style::Color;

/// Theme colors for the interactive shell
pub struct Theme {
    /// Color for assistant response text
    pub assistant: Color,
    /// Color for the user's own turns when replaying history
    pub user: Color,
    pub system: Color,
    pub error: Color,
    /// Color for dim/secondary info
    pub dim: Color,
    pub success: Color,
    pub title: Color,
    /// Color for usage/stats numbers
    pub stats: Color,
    /// Color for slash command names
    pub command: Color,
    pub chat: Color,
    pub code: Color,
    pub image: Color,
}

impl Theme {
    /// Badge color for a model category
    pub fn category(&self, category: Category) -> Color {
        match category {
            Category::Chat => self.chat,
            Category::Code => self.code,
            Category::Image => self.image,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            assistant: Color::White,
            user: Color::Blue,
            system: Color::DarkYellow,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            title: Color::Magenta,
            stats: Color::Blue,
            command: Color::Yellow,
            chat: Color::Blue,
            code: Color::Green,
            image: Color::Magenta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_have_distinct_colors() {
        let theme = Theme::default();
        assert_ne!(theme.category(Category::Chat), theme.category(Category::Code));
        assert_ne!(theme.category(Category::Code), theme.category(Category::Image));
        assert_ne!(theme.category(Category::Chat), theme.category(Category::Image));
    }
}
