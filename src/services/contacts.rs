use std::sync::Arc;

use crate::error::{ContactListError, Result};
use crate::models::{Contact, ContactDto, CreateContactRequest, UpdateContactRequest};
use crate::repository_traits::{
    CategoryRepository, ContactRepository, SubcategoryRepository, UserRepository,
};
use crate::retry::RetryExecutor;
use crate::seed::OTHER_CATEGORY_ID;

/// Contact operations. Storage calls go through the retry executor so a
/// flaky backend does not surface as an immediate 500.
///
/// Reads wrap the whole fetch-and-assemble flow; writes wrap only the
/// storage call, after validation has already passed.
pub struct ContactService {
    contacts: Arc<dyn ContactRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    subcategories: Arc<dyn SubcategoryRepository>,
    retry: RetryExecutor,
}

impl ContactService {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        subcategories: Arc<dyn SubcategoryRepository>,
        retry: RetryExecutor,
    ) -> Self {
        Self {
            contacts,
            users,
            categories,
            subcategories,
            retry,
        }
    }

    pub async fn get_all_contacts(&self) -> Result<Vec<ContactDto>> {
        self.retry
            .execute_async(|| self.load_dtos(None), "get_all_contacts")
            .await
    }

    pub async fn get_contacts_for_user(&self, user_id: i64) -> Result<Vec<ContactDto>> {
        self.retry
            .execute_async(|| self.load_dtos(Some(user_id)), "get_contacts_for_user")
            .await
    }

    pub async fn get_contact(&self, contact_id: i64, user_id: i64) -> Result<ContactDto> {
        self.retry
            .execute_async(
                || async move {
                    let contact = self.find_for_user(contact_id, user_id).await?;
                    self.to_dto(&contact).await
                },
                "get_contact",
            )
            .await
    }

    pub async fn create_contact(
        &self,
        request: &CreateContactRequest,
        user_id: i64,
    ) -> Result<ContactDto> {
        if !self.users.exists(user_id).await? {
            return Err(ContactListError::not_found("User not found"));
        }
        self.check_references(request.category_id, request.subcategory_id)
            .await?;

        let contact = Contact {
            contact_id: 0,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            phone_number: request.phone_number.clone(),
            date_of_birth: request.date_of_birth,
            category_id: request.category_id,
            subcategory_id: request.subcategory_id,
            custom_subcategory: custom_subcategory_for(request.category_id, &request.custom_subcategory),
            user_id,
        };

        let created = self
            .retry
            .execute_async(|| self.contacts.add(&contact), "create_contact")
            .await?;

        tracing::info!("Created contact {} for user {}", created.contact_id, user_id);
        self.to_dto(&created).await
    }

    pub async fn update_contact(
        &self,
        contact_id: i64,
        request: &UpdateContactRequest,
        user_id: i64,
    ) -> Result<()> {
        let mut contact = self.find_for_user(contact_id, user_id).await?;
        self.check_references(request.category_id, request.subcategory_id)
            .await?;

        contact.first_name = request.first_name.clone();
        contact.last_name = request.last_name.clone();
        contact.email = request.email.clone();
        contact.phone_number = request.phone_number.clone();
        contact.date_of_birth = request.date_of_birth;
        contact.category_id = request.category_id;
        contact.subcategory_id = request.subcategory_id;
        contact.custom_subcategory =
            custom_subcategory_for(request.category_id, &request.custom_subcategory);

        self.retry
            .execute_async(|| self.contacts.update(&contact), "update_contact")
            .await?;

        tracing::info!("Updated contact {} for user {}", contact_id, user_id);
        Ok(())
    }

    pub async fn delete_contact(&self, contact_id: i64, user_id: i64) -> Result<()> {
        self.find_for_user(contact_id, user_id).await?;

        self.retry
            .execute_async(|| self.contacts.delete(contact_id), "delete_contact")
            .await?;

        tracing::info!("Deleted contact {} for user {}", contact_id, user_id);
        Ok(())
    }

    /// Category must exist unless it is the custom "Other" category; a
    /// referenced subcategory must exist too.
    async fn check_references(
        &self,
        category_id: i64,
        subcategory_id: Option<i64>,
    ) -> Result<()> {
        if category_id != OTHER_CATEGORY_ID
            && self.categories.get_by_id(category_id).await?.is_none()
        {
            return Err(ContactListError::not_found("Category not found"));
        }
        if let Some(subcategory_id) = subcategory_id {
            if self.subcategories.get_by_id(subcategory_id).await?.is_none() {
                return Err(ContactListError::not_found("Subcategory not found"));
            }
        }
        Ok(())
    }

    /// Contacts are private to their owner; a miss and a foreign contact
    /// are indistinguishable to the caller.
    async fn find_for_user(&self, contact_id: i64, user_id: i64) -> Result<Contact> {
        match self.contacts.get_by_id(contact_id).await? {
            Some(contact) if contact.user_id == user_id => Ok(contact),
            _ => Err(ContactListError::not_found("Contact not found")),
        }
    }

    async fn load_dtos(&self, user_id: Option<i64>) -> Result<Vec<ContactDto>> {
        let contacts = match user_id {
            Some(user_id) => self.contacts.get_all_for_user(user_id).await?,
            None => self.contacts.get_all().await?,
        };

        let mut dtos = Vec::with_capacity(contacts.len());
        for contact in &contacts {
            dtos.push(self.to_dto(contact).await?);
        }
        Ok(dtos)
    }

    async fn to_dto(&self, contact: &Contact) -> Result<ContactDto> {
        let category_name = self
            .categories
            .get_by_id(contact.category_id)
            .await?
            .map(|category| category.name)
            .unwrap_or_default();

        let subcategory_name = match contact.subcategory_id {
            Some(subcategory_id) => self
                .subcategories
                .get_by_id(subcategory_id)
                .await?
                .map(|subcategory| subcategory.name),
            None => None,
        };
        // Fall back to the free-form name for "Other" contacts
        let subcategory_name = subcategory_name.or_else(|| contact.custom_subcategory.clone());

        Ok(ContactDto::from_contact(contact, category_name, subcategory_name))
    }
}

/// The free-form subcategory is only meaningful for the "Other" category;
/// anything else drops it.
fn custom_subcategory_for(category_id: i64, custom: &Option<String>) -> Option<String> {
    if category_id == OTHER_CATEGORY_ID {
        custom.clone()
    } else {
        None
    }
}
