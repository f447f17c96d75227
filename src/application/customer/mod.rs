pub mod create_customer;
pub mod list_customers;
pub mod update_customer;

pub use create_customer::{CreateCustomerCommand, CreateCustomerResponse, CreateCustomerUseCase};
pub use list_customers::{CustomerDto, ListCustomersResponse, ListCustomersUseCase};
pub use update_customer::{UpdateCustomerCommand, UpdateCustomerResponse, UpdateCustomerUseCase};
