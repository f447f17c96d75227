#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use billcore::domain::customer::{
  Customer, CustomerError, CustomerRepository, CustomerService, LoyaltySettingsRepository,
  LoyaltyThresholds, LoyaltyTier,
};
use billcore::domain::invoice::{
  CatalogItem, CatalogItemRepository, Invoice, InvoiceError, InvoiceFilter, InvoiceLineItem,
  InvoiceRepository, InvoiceService, InvoiceTotals, LineItemRepository,
};
use billcore::domain::sync::{
  GatewayError, InvoicePayload, InvoiceSummary, JofotaraGateway,
};

/// Shared backing store for the in-memory repositories, standing in for the
/// database so use cases run against real port implementations.
#[derive(Default)]
pub struct Store {
  pub invoices: Mutex<HashMap<Uuid, Invoice>>,
  pub lines: Mutex<HashMap<Uuid, InvoiceLineItem>>,
  pub customers: Mutex<HashMap<Uuid, Customer>>,
  pub items: Mutex<HashMap<Uuid, CatalogItem>>,
  pub thresholds: Mutex<Option<LoyaltyThresholds>>,
}

impl Store {
  fn lines_for(&self, invoice_id: Uuid) -> Vec<InvoiceLineItem> {
    self
      .lines
      .lock()
      .unwrap()
      .values()
      .filter(|l| l.invoice_id == invoice_id)
      .cloned()
      .collect()
  }

  fn recalculate(&self, invoice_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    let lines = self.lines_for(invoice_id);
    let totals = InvoiceTotals::from_lines(&lines);
    let mut invoices = self.invoices.lock().unwrap();
    let invoice = invoices
      .get_mut(&invoice_id)
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))?;
    invoice.apply_totals(totals);
    Ok(totals)
  }

  fn ensure_draft(&self, invoice_id: Uuid) -> Result<(), InvoiceError> {
    let invoices = self.invoices.lock().unwrap();
    let invoice = invoices
      .get(&invoice_id)
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))?;
    if invoice.is_locked() {
      return Err(InvoiceError::Locked {
        invoice_number: invoice.invoice_number.value().to_string(),
        status: invoice.status,
      });
    }
    Ok(())
  }
}

pub struct InMemoryInvoiceRepository {
  store: Arc<Store>,
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn create(
    &self,
    invoice: Invoice,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<Invoice, InvoiceError> {
    {
      let invoices = self.store.invoices.lock().unwrap();
      if invoices
        .values()
        .any(|existing| existing.invoice_number == invoice.invoice_number)
      {
        return Err(InvoiceError::InvoiceNumberAlreadyExists(
          invoice.invoice_number.value().to_string(),
        ));
      }
    }
    self
      .store
      .invoices
      .lock()
      .unwrap()
      .insert(invoice.id, invoice.clone());
    let mut stored = self.store.lines.lock().unwrap();
    for line in lines {
      stored.insert(line.id, line);
    }
    Ok(invoice)
  }

  async fn update_header(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    let mut invoices = self.store.invoices.lock().unwrap();
    let entry = invoices
      .get_mut(&invoice.id)
      .ok_or(InvoiceError::InvoiceNotFound(invoice.id))?;
    // Status and aggregates only move through their dedicated operations
    let mut updated = invoice.clone();
    updated.status = entry.status;
    updated.subtotal = entry.subtotal;
    updated.discount_total = entry.discount_total;
    updated.tax_total = entry.tax_total;
    updated.total_due = entry.total_due;
    *entry = updated;
    Ok(())
  }

  async fn update_status(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    let mut invoices = self.store.invoices.lock().unwrap();
    let entry = invoices
      .get_mut(&invoice.id)
      .ok_or(InvoiceError::InvoiceNotFound(invoice.id))?;
    entry.status = invoice.status;
    entry.payment_method = invoice.payment_method;
    Ok(())
  }

  async fn recalculate(&self, invoice_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    self.store.recalculate(invoice_id)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    Ok(self.store.invoices.lock().unwrap().get(&id).cloned())
  }

  async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, InvoiceError> {
    let mut invoices: Vec<Invoice> = self
      .store
      .invoices
      .lock()
      .unwrap()
      .values()
      .filter(|i| filter.status.is_none_or(|s| i.status == s))
      .filter(|i| filter.customer_id.is_none_or(|c| i.customer_id == Some(c)))
      .cloned()
      .collect();
    invoices.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
    Ok(invoices)
  }

  async fn max_sequence_suffix(&self) -> Result<Option<u64>, InvoiceError> {
    Ok(
      self
        .store
        .invoices
        .lock()
        .unwrap()
        .values()
        .filter_map(|i| i.invoice_number.sequence_suffix())
        .max(),
    )
  }

  async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64, InvoiceError> {
    Ok(
      self
        .store
        .invoices
        .lock()
        .unwrap()
        .values()
        .filter(|i| i.customer_id == Some(customer_id))
        .count() as u64,
    )
  }
}

/// Invoice repository double simulating a concurrent writer: for the first
/// `races` calls, `create` stores a rival invoice under the requested number
/// and reports the unique-constraint collision, as Postgres would.
pub struct RacingInvoiceRepository {
  inner: Arc<InMemoryInvoiceRepository>,
  store: Arc<Store>,
  races: Mutex<u32>,
}

#[async_trait]
impl InvoiceRepository for RacingInvoiceRepository {
  async fn create(
    &self,
    invoice: Invoice,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<Invoice, InvoiceError> {
    {
      let mut races = self.races.lock().unwrap();
      if *races > 0 {
        *races -= 1;
        let mut rival = invoice.clone();
        rival.id = Uuid::new_v4();
        self
          .store
          .invoices
          .lock()
          .unwrap()
          .insert(rival.id, rival);
        return Err(InvoiceError::InvoiceNumberAlreadyExists(
          invoice.invoice_number.value().to_string(),
        ));
      }
    }
    self.inner.create(invoice, lines).await
  }

  async fn update_header(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    self.inner.update_header(invoice).await
  }

  async fn update_status(&self, invoice: &Invoice) -> Result<(), InvoiceError> {
    self.inner.update_status(invoice).await
  }

  async fn recalculate(&self, invoice_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    self.inner.recalculate(invoice_id).await
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    self.inner.find_by_id(id).await
  }

  async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, InvoiceError> {
    self.inner.list(filter).await
  }

  async fn max_sequence_suffix(&self) -> Result<Option<u64>, InvoiceError> {
    self.inner.max_sequence_suffix().await
  }

  async fn count_for_customer(&self, customer_id: Uuid) -> Result<u64, InvoiceError> {
    self.inner.count_for_customer(customer_id).await
  }
}

pub struct InMemoryLineItemRepository {
  store: Arc<Store>,
}

#[async_trait]
impl LineItemRepository for InMemoryLineItemRepository {
  async fn save_and_recalculate(
    &self,
    line: &InvoiceLineItem,
  ) -> Result<InvoiceTotals, InvoiceError> {
    self.store.ensure_draft(line.invoice_id)?;
    self
      .store
      .lines
      .lock()
      .unwrap()
      .insert(line.id, line.clone());
    self.store.recalculate(line.invoice_id)
  }

  async fn delete_and_recalculate(&self, line_id: Uuid) -> Result<InvoiceTotals, InvoiceError> {
    let invoice_id = {
      let lines = self.store.lines.lock().unwrap();
      lines
        .get(&line_id)
        .map(|l| l.invoice_id)
        .ok_or(InvoiceError::LineItemNotFound(line_id))?
    };
    self.store.ensure_draft(invoice_id)?;
    self.store.lines.lock().unwrap().remove(&line_id);
    self.store.recalculate(invoice_id)
  }

  async fn replace_for_invoice(
    &self,
    invoice_id: Uuid,
    lines: Vec<InvoiceLineItem>,
  ) -> Result<InvoiceTotals, InvoiceError> {
    {
      let mut stored = self.store.lines.lock().unwrap();
      stored.retain(|_, l| l.invoice_id != invoice_id);
      for line in lines {
        stored.insert(line.id, line);
      }
    }
    self.store.recalculate(invoice_id)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError> {
    Ok(self.store.lines.lock().unwrap().get(&id).cloned())
  }

  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
    Ok(self.store.lines_for(invoice_id))
  }

  async fn count_by_invoice_id(&self, invoice_id: Uuid) -> Result<u64, InvoiceError> {
    Ok(self.store.lines_for(invoice_id).len() as u64)
  }
}

pub struct InMemoryCatalogItemRepository {
  store: Arc<Store>,
}

#[async_trait]
impl CatalogItemRepository for InMemoryCatalogItemRepository {
  async fn find_by_name(&self, name: &str) -> Result<Option<CatalogItem>, InvoiceError> {
    Ok(
      self
        .store
        .items
        .lock()
        .unwrap()
        .values()
        .find(|i| i.name == name)
        .cloned(),
    )
  }

  async fn get_or_create(&self, item: CatalogItem) -> Result<CatalogItem, InvoiceError> {
    let mut items = self.store.items.lock().unwrap();
    if let Some(existing) = items.values().find(|i| i.name == item.name) {
      return Ok(existing.clone());
    }
    items.insert(item.id, item.clone());
    Ok(item)
  }
}

pub struct InMemoryCustomerRepository {
  store: Arc<Store>,
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
  async fn create(&self, customer: Customer) -> Result<Customer, CustomerError> {
    self
      .store
      .customers
      .lock()
      .unwrap()
      .insert(customer.id, customer.clone());
    Ok(customer)
  }

  async fn update(&self, customer: Customer) -> Result<Customer, CustomerError> {
    let mut customers = self.store.customers.lock().unwrap();
    if !customers.contains_key(&customer.id) {
      return Err(CustomerError::CustomerNotFound(customer.id));
    }
    customers.insert(customer.id, customer.clone());
    Ok(customer)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, CustomerError> {
    Ok(self.store.customers.lock().unwrap().get(&id).cloned())
  }

  async fn find_by_full_name(&self, full_name: &str) -> Result<Option<Customer>, CustomerError> {
    Ok(
      self
        .store
        .customers
        .lock()
        .unwrap()
        .values()
        .find(|c| c.name.full_name() == full_name)
        .cloned(),
    )
  }

  async fn list(&self) -> Result<Vec<Customer>, CustomerError> {
    Ok(self.store.customers.lock().unwrap().values().cloned().collect())
  }

  async fn update_loyalty_tier(&self, id: Uuid, tier: LoyaltyTier) -> Result<(), CustomerError> {
    let mut customers = self.store.customers.lock().unwrap();
    let customer = customers
      .get_mut(&id)
      .ok_or(CustomerError::CustomerNotFound(id))?;
    customer.loyalty_tier = tier;
    Ok(())
  }
}

pub struct InMemoryLoyaltySettingsRepository {
  store: Arc<Store>,
}

#[async_trait]
impl LoyaltySettingsRepository for InMemoryLoyaltySettingsRepository {
  async fn load(&self) -> Result<LoyaltyThresholds, CustomerError> {
    Ok(self.store.thresholds.lock().unwrap().unwrap_or_default())
  }

  async fn save(&self, thresholds: LoyaltyThresholds) -> Result<(), CustomerError> {
    *self.store.thresholds.lock().unwrap() = Some(thresholds);
    Ok(())
  }
}

/// Scripted gateway double for sync tests.
#[derive(Default)]
pub struct FakeGateway {
  pub fail_login: bool,
  pub pages: Vec<Vec<InvoiceSummary>>,
  pub payloads: HashMap<Uuid, InvoicePayload>,
}

#[async_trait]
impl JofotaraGateway for FakeGateway {
  async fn login(&self) -> Result<(), GatewayError> {
    if self.fail_login {
      return Err(GatewayError::LoginFailed("bad credentials".to_string()));
    }
    Ok(())
  }

  async fn fetch_invoice_page(&self, page: u32) -> Result<Vec<InvoiceSummary>, GatewayError> {
    Ok(
      self
        .pages
        .get((page - 1) as usize)
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn fetch_invoice(
    &self,
    uuid: Uuid,
    _invoice_number: &str,
  ) -> Result<InvoicePayload, GatewayError> {
    self
      .payloads
      .get(&uuid)
      .cloned()
      .ok_or_else(|| GatewayError::InvalidPayload(format!("no payload for {}", uuid)))
  }
}

/// Fully wired service graph over a shared in-memory store.
pub struct TestContext {
  pub store: Arc<Store>,
  pub invoice_repo: Arc<InMemoryInvoiceRepository>,
  pub line_repo: Arc<InMemoryLineItemRepository>,
  pub item_repo: Arc<InMemoryCatalogItemRepository>,
  pub customer_service: Arc<CustomerService>,
  pub invoice_service: Arc<InvoiceService>,
}

pub fn test_context() -> TestContext {
  let store = Arc::new(Store::default());
  let invoice_repo = Arc::new(InMemoryInvoiceRepository {
    store: store.clone(),
  });
  let line_repo = Arc::new(InMemoryLineItemRepository {
    store: store.clone(),
  });
  let item_repo = Arc::new(InMemoryCatalogItemRepository {
    store: store.clone(),
  });
  let customer_repo = Arc::new(InMemoryCustomerRepository {
    store: store.clone(),
  });
  let settings_repo = Arc::new(InMemoryLoyaltySettingsRepository {
    store: store.clone(),
  });

  let customer_service = Arc::new(CustomerService::new(
    customer_repo,
    settings_repo,
    invoice_repo.clone(),
  ));
  let invoice_service = Arc::new(InvoiceService::new(
    invoice_repo.clone(),
    line_repo.clone(),
    customer_service.clone(),
  ));

  TestContext {
    store,
    invoice_repo,
    line_repo,
    item_repo,
    customer_service,
    invoice_service,
  }
}

/// Service graph whose invoice repository loses the numbering race `races`
/// times before creation succeeds.
pub fn racing_context(races: u32) -> (Arc<Store>, Arc<InvoiceService>) {
  let store = Arc::new(Store::default());
  let inner = Arc::new(InMemoryInvoiceRepository {
    store: store.clone(),
  });
  let invoice_repo = Arc::new(RacingInvoiceRepository {
    inner,
    store: store.clone(),
    races: Mutex::new(races),
  });
  let line_repo = Arc::new(InMemoryLineItemRepository {
    store: store.clone(),
  });
  let customer_repo = Arc::new(InMemoryCustomerRepository {
    store: store.clone(),
  });
  let settings_repo = Arc::new(InMemoryLoyaltySettingsRepository {
    store: store.clone(),
  });

  let customer_service = Arc::new(CustomerService::new(
    customer_repo,
    settings_repo,
    invoice_repo.clone(),
  ));
  let invoice_service = Arc::new(InvoiceService::new(
    invoice_repo,
    line_repo,
    customer_service,
  ));
  (store, invoice_service)
}
