pub mod add_line_item;
pub mod change_invoice_status;
pub mod create_invoice;
pub mod get_invoice_details;
pub mod list_invoices;
pub mod remove_line_item;
pub mod update_line_item;

pub use add_line_item::{AddLineItemCommand, AddLineItemUseCase, LineItemTotalsDto};
pub use change_invoice_status::{
  ChangeInvoiceStatusCommand, ChangeInvoiceStatusResponse, ChangeInvoiceStatusUseCase,
};
pub use create_invoice::{
  CreateInvoiceCommand, CreateInvoiceResponse, CreateInvoiceUseCase, CreateLineItemDto,
};
pub use get_invoice_details::{
  GetInvoiceDetailsUseCase, InvoiceDetailsResponse, InvoiceLineItemDto,
};
pub use list_invoices::{
  InvoiceListItemDto, ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase,
};
pub use remove_line_item::{RemoveLineItemCommand, RemoveLineItemResponse, RemoveLineItemUseCase};
pub use update_line_item::{UpdateLineItemCommand, UpdateLineItemUseCase};
