pub mod customer_repository;
pub mod invoice_repository;
pub mod item_repository;
pub mod line_item_repository;
pub mod loyalty_settings_repository;

pub use customer_repository::PostgresCustomerRepository;
pub use invoice_repository::PostgresInvoiceRepository;
pub use item_repository::PostgresCatalogItemRepository;
pub use line_item_repository::PostgresLineItemRepository;
pub use loyalty_settings_repository::PostgresLoyaltySettingsRepository;
