/// Business-logic services behind the HTTP handlers
pub mod categories;
pub mod contacts;
pub mod subcategories;
pub mod users;

#[cfg(test)]
mod test_services;

pub use categories::CategoryService;
pub use contacts::ContactService;
pub use subcategories::SubcategoryService;
pub use users::UserService;
