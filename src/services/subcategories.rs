use std::sync::Arc;

use crate::error::{ContactListError, Result};
use crate::models::{
    CreateSubcategoryRequest, Subcategory, SubcategoryDto, UpdateSubcategoryRequest,
};
use crate::repository_traits::{CategoryRepository, SubcategoryRepository};

/// Subcategory operations. Every subcategory hangs off an existing category.
pub struct SubcategoryService {
    subcategories: Arc<dyn SubcategoryRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl SubcategoryService {
    pub fn new(
        subcategories: Arc<dyn SubcategoryRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            subcategories,
            categories,
        }
    }

    pub async fn get_subcategories_for_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<SubcategoryDto>> {
        if self.categories.get_by_id(category_id).await?.is_none() {
            return Err(ContactListError::not_found("Category not found"));
        }

        let subcategories = self.subcategories.get_for_category(category_id).await?;
        Ok(subcategories.iter().map(SubcategoryDto::from).collect())
    }

    pub async fn get_subcategory(&self, subcategory_id: i64) -> Result<SubcategoryDto> {
        let subcategory = self
            .subcategories
            .get_by_id(subcategory_id)
            .await?
            .ok_or_else(|| ContactListError::not_found("Subcategory not found"))?;
        Ok(SubcategoryDto::from(&subcategory))
    }

    pub async fn create_subcategory(
        &self,
        request: &CreateSubcategoryRequest,
    ) -> Result<SubcategoryDto> {
        if self
            .categories
            .get_by_id(request.category_id)
            .await?
            .is_none()
        {
            return Err(ContactListError::not_found("Category not found"));
        }

        let subcategory = Subcategory {
            subcategory_id: 0,
            name: request.name.clone(),
            category_id: request.category_id,
        };
        let created = self.subcategories.add(&subcategory).await?;

        tracing::info!(
            "Created subcategory {} '{}' in category {}",
            created.subcategory_id,
            created.name,
            created.category_id
        );
        Ok(SubcategoryDto::from(&created))
    }

    pub async fn update_subcategory(
        &self,
        subcategory_id: i64,
        request: &UpdateSubcategoryRequest,
    ) -> Result<()> {
        let mut subcategory = self
            .subcategories
            .get_by_id(subcategory_id)
            .await?
            .ok_or_else(|| ContactListError::not_found("Subcategory not found"))?;

        if self
            .categories
            .get_by_id(request.category_id)
            .await?
            .is_none()
        {
            return Err(ContactListError::not_found("Category not found"));
        }

        subcategory.name = request.name.clone();
        subcategory.category_id = request.category_id;
        self.subcategories.update(&subcategory).await?;

        tracing::info!("Updated subcategory {}", subcategory_id);
        Ok(())
    }

    pub async fn delete_subcategory(&self, subcategory_id: i64) -> Result<()> {
        if self.subcategories.get_by_id(subcategory_id).await?.is_none() {
            return Err(ContactListError::not_found("Subcategory not found"));
        }
        self.subcategories.delete(subcategory_id).await?;

        tracing::info!("Deleted subcategory {}", subcategory_id);
        Ok(())
    }
}
