//! # Category Module
//!
//! Line categories and the stable grouping used by the budget table.
//!
//! ## Tags and Labels
//! ```text
//! ┌──────────────┬──────────────────────┐
//! │ tag          │ label                │
//! ├──────────────┼──────────────────────┤
//! │ corporeo     │ Letras Corpóreas     │
//! │ cartel       │ Carteles             │
//! │ material     │ Materiales           │
//! │ vinilo       │ Vinilos              │
//! │ otros        │ Otros                │
//! │ <anything>   │ Otros                │
//! └──────────────┴──────────────────────┘
//! ```
//!
//! The vocabulary is open: imported rows may carry tags the shop never
//! defined. They keep their own tag (and their own group) but are labelled
//! "Otros".

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::line::BudgetLineItem;
use crate::money::Money;

/// Category of a budget line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Letras corpóreas (3D letters).
    Corporeo,
    /// Carteles (signboards).
    Cartel,
    /// Raw materials billed to the client.
    Material,
    /// Vinyl work.
    Vinilo,
    /// Catch-all.
    #[default]
    Otros,
    /// A tag outside the known vocabulary.
    Custom(String),
}

impl Category {
    /// Every known category, in menu order.
    pub const KNOWN: [Category; 5] = [
        Category::Corporeo,
        Category::Cartel,
        Category::Material,
        Category::Vinilo,
        Category::Otros,
    ];

    /// Parses a stored tag. Tags are trimmed and lowercased, so `"Otros"`
    /// and `"otros"` are the same category. Empty tags fall back to `otros`.
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::category::Category;
    ///
    /// assert_eq!(Category::from_tag("corporeo"), Category::Corporeo);
    /// assert_eq!(Category::from_tag(""), Category::Otros);
    /// assert_eq!(Category::from_tag(" Cartel "), Category::Cartel);
    /// assert_eq!(Category::from_tag("neon").label(), "Otros");
    /// ```
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "corporeo" => Category::Corporeo,
            "cartel" => Category::Cartel,
            "material" => Category::Material,
            "vinilo" => Category::Vinilo,
            "otros" | "" => Category::Otros,
            _ => Category::Custom(tag),
        }
    }

    /// The stored tag.
    pub fn tag(&self) -> &str {
        match self {
            Category::Corporeo => "corporeo",
            Category::Cartel => "cartel",
            Category::Material => "material",
            Category::Vinilo => "vinilo",
            Category::Otros => "otros",
            Category::Custom(tag) => tag,
        }
    }

    /// Human label shown as the group heading.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Corporeo => "Letras Corpóreas",
            Category::Cartel => "Carteles",
            Category::Material => "Materiales",
            Category::Vinilo => "Vinilos",
            Category::Otros | Category::Custom(_) => "Otros",
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Category::from_tag(&tag)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> String {
        category.tag().to_string()
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Lines sharing one category tag, in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub items: Vec<&'a BudgetLineItem>,
}

impl CategoryGroup<'_> {
    /// Group heading.
    pub fn label(&self) -> &'static str {
        self.category.label()
    }

    /// Sum of the group's line totals.
    ///
    /// ## Errors
    /// - `NotFinite` if the sum overflows
    pub fn subtotal(&self) -> ValidationResult<Money> {
        Money::checked_sum(self.items.iter().map(|line| line.line_total()))
            .ok_or_else(|| ValidationError::not_finite("subtotal"))
    }
}

/// Groups lines by category tag.
///
/// Groups appear in the order their tag is first seen and lines keep their
/// collection order inside each group.
///
/// ## Example
/// ```text
/// items:  [cartel #1, corporeo #2, cartel #3]
///            │
///            ▼
/// groups: Carteles         → [#1, #3]
///         Letras Corpóreas → [#2]
/// ```
pub fn group_by_category(items: &[BudgetLineItem]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();

    for line in items {
        match groups.iter_mut().find(|g| g.category == line.category) {
            Some(group) => group.items.push(line),
            None => groups.push(CategoryGroup {
                category: line.category.clone(),
                items: vec![line],
            }),
        }
    }

    groups
}

// =============================================================================
// Unit Tests
// =============================================================================
