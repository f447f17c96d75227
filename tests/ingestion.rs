mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use billcore::application::sync::{IngestInvoiceUseCase, SyncError, SyncInvoicesUseCase};
use billcore::domain::invoice::InvoiceStatus;
use billcore::domain::sync::{
  CustomerDto, InvoiceItemDto, InvoicePayload, InvoiceSummary, SellerDto,
};

use common::{FakeGateway, TestContext, test_context};

fn ingest_use_case(ctx: &TestContext) -> Arc<IngestInvoiceUseCase> {
  Arc::new(IngestInvoiceUseCase::new(
    ctx.invoice_repo.clone(),
    ctx.line_repo.clone(),
    ctx.item_repo.clone(),
    ctx.customer_service.clone(),
  ))
}

fn payload(uuid: Uuid, number: &str) -> InvoicePayload {
  InvoicePayload {
    invoice_unique_identifier: uuid,
    invoice_number: number.to_string(),
    issue_date: Some("05-03-2026".to_string()),
    currency_enum: Some("JOD".to_string()),
    total_payable_amount: Some(dec!(24.00)),
    seller_dto: Some(SellerDto {
      name: Some("Petra Stores".to_string()),
      tax_number: Some("123456789".to_string()),
      mobile_number: None,
    }),
    customer_dto: Some(CustomerDto {
      customer_name: Some("Lina Haddad".to_string()),
      additional_customer_id: None,
    }),
    invoice_item_dto_list: vec![
      InvoiceItemDto {
        id: Some(1),
        product_description: Some("Ceramic mug".to_string()),
        quantity: Some(2),
        unit_price: Some(dec!(10.00)),
        discount: None,
        subtotal_amount: Some(dec!(20.00)),
      },
      InvoiceItemDto {
        id: Some(2),
        product_description: Some("Gift wrap".to_string()),
        quantity: Some(1),
        unit_price: Some(dec!(5.00)),
        discount: Some(dec!(1.00)),
        subtotal_amount: Some(dec!(5.00)),
      },
    ],
    qr_code_image: Some(format!(
      "data:image/png;base64,{}",
      BASE64.encode(b"qr-bytes")
    )),
    xml: None,
  }
}

#[tokio::test]
async fn test_ingest_maps_payload_onto_local_schema() {
  let ctx = test_context();
  let uuid = Uuid::new_v4();

  let response = ingest_use_case(&ctx)
    .execute(payload(uuid, "EIN00007"))
    .await
    .unwrap();
  assert!(response.created);
  assert_eq!(response.invoice_id, uuid);
  assert_eq!(response.line_count, 2);
  assert_eq!(response.total_due, dec!(24.00));

  let invoice = ctx.store.invoices.lock().unwrap().get(&uuid).cloned().unwrap();
  assert_eq!(invoice.invoice_number.value(), "EIN00007");
  assert_eq!(invoice.status, InvoiceStatus::Draft);
  assert_eq!(
    invoice.issue_date,
    NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
  );
  assert_eq!(invoice.currency_name, "JOD");
  assert_eq!(invoice.seller_name.as_deref(), Some("Petra Stores"));
  assert_eq!(invoice.seller_tax_number.as_deref(), Some("123456789"));
  assert_eq!(invoice.qr_image.as_deref(), Some(b"qr-bytes".as_slice()));
  assert_eq!(invoice.subtotal, dec!(25.00));
  assert_eq!(invoice.discount_total, dec!(1.00));

  // The upstream customer name lands as a registered customer
  let customer = ctx
    .customer_service
    .get_customer(invoice.customer_id.unwrap())
    .await
    .unwrap();
  assert_eq!(customer.name.full_name(), "Lina Haddad");

  // Every line description becomes a catalog item
  assert_eq!(ctx.store.items.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reingest_is_idempotent_and_replaces_lines() {
  let ctx = test_context();
  let ingest = ingest_use_case(&ctx);
  let uuid = Uuid::new_v4();

  ingest.execute(payload(uuid, "EIN00007")).await.unwrap();

  let mut second = payload(uuid, "EIN00007");
  second.invoice_item_dto_list.truncate(1);
  let response = ingest.execute(second).await.unwrap();

  assert!(!response.created);
  assert_eq!(response.line_count, 1);
  assert_eq!(response.total_due, dec!(20.00));
  assert_eq!(ctx.store.invoices.lock().unwrap().len(), 1);

  let lines: Vec<_> = ctx
    .store
    .lines
    .lock()
    .unwrap()
    .values()
    .filter(|l| l.invoice_id == uuid)
    .cloned()
    .collect();
  assert_eq!(lines.len(), 1);

  // No duplicate customer either
  assert_eq!(ctx.store.customers.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sparse_line_items_fall_back_to_defaults() {
  let ctx = test_context();
  let uuid = Uuid::new_v4();

  let mut sparse = payload(uuid, "EIN00009");
  sparse.invoice_item_dto_list = vec![InvoiceItemDto::default()];
  sparse.customer_dto = None;
  sparse.qr_code_image = None;

  let response = ingest_use_case(&ctx).execute(sparse).await.unwrap();
  assert_eq!(response.line_count, 1);
  assert_eq!(response.total_due, dec!(0.00));

  let invoice = ctx.store.invoices.lock().unwrap().get(&uuid).cloned().unwrap();
  assert!(invoice.customer_id.is_none());
  assert!(invoice.qr_image.is_none());

  let line = ctx
    .store
    .lines
    .lock()
    .unwrap()
    .values()
    .find(|l| l.invoice_id == uuid)
    .cloned()
    .unwrap();
  assert_eq!(line.description.value(), "Imported item");
  assert_eq!(line.quantity.value(), 1);
  assert_eq!(line.unit_price.value(), dec!(0));
}

#[tokio::test]
async fn test_malformed_issue_date_is_rejected() {
  let ctx = test_context();
  let mut bad = payload(Uuid::new_v4(), "EIN00010");
  bad.issue_date = Some("2026-03-05".to_string());

  let err = ingest_use_case(&ctx).execute(bad).await.unwrap_err();
  assert!(matches!(err, SyncError::InvalidIssueDate(_)));
}

#[tokio::test]
async fn test_sync_walks_pages_and_skips_bad_invoices() {
  let ctx = test_context();
  let good_a = Uuid::new_v4();
  let good_b = Uuid::new_v4();
  let missing = Uuid::new_v4();

  let mut payloads = HashMap::new();
  payloads.insert(good_a, payload(good_a, "EIN00001"));
  payloads.insert(good_b, payload(good_b, "EIN00002"));
  // `missing` has no detail payload, so its fetch fails and is skipped

  let gateway = Arc::new(FakeGateway {
    fail_login: false,
    pages: vec![
      vec![
        InvoiceSummary {
          uuid: good_a,
          invoice_number: "EIN00001".to_string(),
        },
        InvoiceSummary {
          uuid: missing,
          invoice_number: "EIN00099".to_string(),
        },
      ],
      vec![InvoiceSummary {
        uuid: good_b,
        invoice_number: "EIN00002".to_string(),
      }],
    ],
    payloads,
  });

  let summary = SyncInvoicesUseCase::new(gateway, ingest_use_case(&ctx))
    .execute()
    .await
    .unwrap();

  assert_eq!(summary.pages_fetched, 2);
  assert_eq!(summary.invoices_seen, 3);
  assert_eq!(summary.invoices_created, 2);
  assert_eq!(summary.invoices_updated, 0);
  assert_eq!(summary.invoices_failed, 1);
  assert_eq!(ctx.store.invoices.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sync_aborts_when_login_fails() {
  let ctx = test_context();
  let gateway = Arc::new(FakeGateway {
    fail_login: true,
    ..FakeGateway::default()
  });

  let err = SyncInvoicesUseCase::new(gateway, ingest_use_case(&ctx))
    .execute()
    .await
    .unwrap_err();
  assert!(matches!(err, SyncError::Gateway(_)));
  assert!(ctx.store.invoices.lock().unwrap().is_empty());
}
