use std::sync::Arc;

use crate::error::{ContactListError, Result};
use crate::models::{
    Category, CategoryDto, CreateCategoryRequest, SubcategoryDto, UpdateCategoryRequest,
};
use crate::repository_traits::{CategoryRepository, ContactRepository, SubcategoryRepository};

/// Category operations. Names are unique, and a category that any contact
/// still points at cannot be deleted.
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    subcategories: Arc<dyn SubcategoryRepository>,
    contacts: Arc<dyn ContactRepository>,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        subcategories: Arc<dyn SubcategoryRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        Self {
            categories,
            subcategories,
            contacts,
        }
    }

    pub async fn get_all_categories(&self) -> Result<Vec<CategoryDto>> {
        let categories = self.categories.get_all().await?;

        let mut dtos = Vec::with_capacity(categories.len());
        for category in &categories {
            dtos.push(self.to_dto(category).await?);
        }
        Ok(dtos)
    }

    pub async fn get_category(&self, category_id: i64) -> Result<CategoryDto> {
        let category = self
            .categories
            .get_by_id(category_id)
            .await?
            .ok_or_else(|| ContactListError::not_found("Category not found"))?;
        self.to_dto(&category).await
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<CategoryDto> {
        let category = self
            .categories
            .get_by_name(name)
            .await?
            .ok_or_else(|| ContactListError::not_found("Category not found"))?;
        self.to_dto(&category).await
    }

    pub async fn create_category(&self, request: &CreateCategoryRequest) -> Result<CategoryDto> {
        if self.categories.get_by_name(&request.name).await?.is_some() {
            return Err(ContactListError::BadRequest(
                "A category with this name already exists".to_string(),
            ));
        }

        let category = Category {
            category_id: 0,
            name: request.name.clone(),
        };
        let created = self.categories.add(&category).await?;

        tracing::info!("Created category {} '{}'", created.category_id, created.name);
        Ok(CategoryDto::from_category(&created, None))
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        request: &UpdateCategoryRequest,
    ) -> Result<()> {
        let mut category = self
            .categories
            .get_by_id(category_id)
            .await?
            .ok_or_else(|| ContactListError::not_found("Category not found"))?;

        // Unique name check, excluding the category itself
        if let Some(existing) = self.categories.get_by_name(&request.name).await? {
            if existing.category_id != category_id {
                return Err(ContactListError::BadRequest(
                    "A category with this name already exists".to_string(),
                ));
            }
        }

        category.name = request.name.clone();
        self.categories.update(&category).await?;

        tracing::info!("Updated category {}", category_id);
        Ok(())
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        if self.categories.get_by_id(category_id).await?.is_none() {
            return Err(ContactListError::not_found("Category not found"));
        }

        let contacts = self.contacts.get_all().await?;
        if contacts.iter().any(|c| c.category_id == category_id) {
            return Err(ContactListError::BadRequest(
                "Cannot delete a category that is used by contacts".to_string(),
            ));
        }

        // Subcategories do not outlive their category
        for subcategory in self.subcategories.get_for_category(category_id).await? {
            self.subcategories
                .delete(subcategory.subcategory_id)
                .await?;
        }
        self.categories.delete(category_id).await?;

        tracing::info!("Deleted category {}", category_id);
        Ok(())
    }

    async fn to_dto(&self, category: &Category) -> Result<CategoryDto> {
        let subcategories = self
            .subcategories
            .get_for_category(category.category_id)
            .await?
            .iter()
            .map(SubcategoryDto::from)
            .collect::<Vec<_>>();
        Ok(CategoryDto::from_category(category, Some(subcategories)))
    }
}
