//! Recipe domain model
//!
//! A recipe owns its ingredients and an ordered list of instruction steps.
//! Edits happen on a [`RecipeDraft`], which is saved as a whole: the stored
//! children are replaced by the draft's children in one transaction.

use serde::{Deserialize, Serialize};

use super::id::{IngredientId, InstructionId, RecipeId, UnitId};
use super::input::{checked_quantity, contains_ignore_case, required, ValidationError};

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Recipe {
    /// Name or author contains `query`, ignoring case
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query) || contains_ignore_case(&self.author, query)
    }
}

/// A stored ingredient row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub recipe_id: RecipeId,
    pub name: String,
    pub quantity: f64,
    pub unit_id: UnitId,
}

/// A stored instruction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInstruction {
    pub id: InstructionId,
    pub recipe_id: RecipeId,
    pub step_number: u32,
    pub instruction: String,
}

/// An ingredient that isn't tied to a stored row
///
/// Used by drafts and when copying ingredients onto a grocery list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: f64,
    pub unit_id: UnitId,
}

impl IngredientLine {
    pub fn new(name: &str, quantity: f64, unit_id: UnitId) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("ingredient name", name)?,
            quantity: checked_quantity(quantity)?,
            unit_id,
        })
    }
}

impl From<&Ingredient> for IngredientLine {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            quantity: ingredient.quantity,
            unit_id: ingredient.unit_id,
        }
    }
}

/// One step of a draft; `step_number` is its 1-based position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub step_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeWithIngredients {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeWithInstructions {
    pub recipe: Recipe,
    pub instructions: Vec<RecipeInstruction>,
}

/// Everything needed to show a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<RecipeInstruction>,
}

/// In-memory editing state for a new or existing recipe
///
/// Steps are always numbered `1..=n` in sequence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    id: Option<RecipeId>,
    name: String,
    author: String,
    image: Option<String>,
    ingredients: Vec<IngredientLine>,
    steps: Vec<InstructionStep>,
}

impl RecipeDraft {
    /// Starts a draft for a recipe that doesn't exist yet
    pub fn new(name: &str, author: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            author: author.trim().to_string(),
            ..Self::default()
        }
    }

    /// Starts a draft from a stored recipe
    pub fn edit(detail: &RecipeDetail) -> Self {
        let mut instructions: Vec<&RecipeInstruction> = detail.instructions.iter().collect();
        instructions.sort_by_key(|i| i.step_number);

        let mut draft = Self {
            id: Some(detail.recipe.id),
            name: detail.recipe.name.clone(),
            author: detail.recipe.author.clone(),
            image: detail.recipe.image.clone(),
            ingredients: detail.ingredients.iter().map(IngredientLine::from).collect(),
            steps: instructions
                .into_iter()
                .map(|i| InstructionStep {
                    step_number: 0,
                    text: i.instruction.clone(),
                })
                .collect(),
        };
        draft.renumber_from(0);
        draft
    }

    pub fn id(&self) -> Option<RecipeId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn ingredients(&self) -> &[IngredientLine] {
        &self.ingredients
    }

    pub fn steps(&self) -> &[InstructionStep] {
        &self.steps
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    pub fn set_author(&mut self, author: &str) {
        self.author = author.trim().to_string();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.image = image.filter(|s| !s.trim().is_empty());
    }

    pub fn add_ingredient(&mut self, line: IngredientLine) {
        self.ingredients.push(line);
    }

    /// Replaces the ingredient at `index`; returns false if out of range
    pub fn update_ingredient(&mut self, index: usize, line: IngredientLine) -> bool {
        match self.ingredients.get_mut(index) {
            Some(slot) => {
                *slot = line;
                true
            }
            None => false,
        }
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<IngredientLine> {
        (index < self.ingredients.len()).then(|| self.ingredients.remove(index))
    }

    pub fn clear_ingredients(&mut self) {
        self.ingredients.clear();
    }

    /// Appends a step; blank text is rejected
    pub fn add_instruction(&mut self, text: &str) -> Result<u32, ValidationError> {
        let text = required("instruction", text)?;
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(InstructionStep { step_number, text });
        Ok(step_number)
    }

    /// Rewrites the text of the step at `index`
    pub fn update_instruction(&mut self, index: usize, text: &str) -> Result<bool, ValidationError> {
        let text = required("instruction", text)?;
        Ok(match self.steps.get_mut(index) {
            Some(step) => {
                step.text = text;
                true
            }
            None => false,
        })
    }

    /// Removes the step at `index` and closes the gap in the numbering
    pub fn remove_instruction(&mut self, index: usize) -> Option<InstructionStep> {
        if index >= self.steps.len() {
            return None;
        }
        let removed = self.steps.remove(index);
        self.renumber_from(index);
        Some(removed)
    }

    pub fn clear_instructions(&mut self) {
        self.steps.clear();
    }

    fn renumber_from(&mut self, index: usize) {
        for (position, step) in self.steps.iter_mut().enumerate().skip(index) {
            step.step_number = position as u32 + 1;
        }
    }

    /// Name present, at least one ingredient and one step
    pub fn can_save(&self) -> bool {
        !self.name.is_empty() && !self.ingredients.is_empty() && !self.steps.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.can_save() {
            Ok(())
        } else {
            Err(ValidationError::IncompleteRecipe)
        }
    }
}
