pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  CatalogItem, DEFAULT_CURRENCY, Invoice, InvoiceField, InvoiceLineItem, InvoiceTotals, LineTotals,
};
pub use errors::InvoiceError;
pub use ports::{CatalogItemRepository, InvoiceFilter, InvoiceRepository, LineItemRepository};
pub use services::{InvoiceService, NewInvoice, NewLineItem};
pub use value_objects::{
  Amount, InvoiceNumber, InvoiceStatus, LineDescription, PaymentMethod, Quantity, TaxRate,
  ValueObjectError,
};
