use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use supplyerp_core::{CompanyId, Currency};
use supplyerp_parties::PartyId;

/// Caller-supplied context of a purchasing request.
///
/// Everything that would otherwise be read from ambient state (the acting
/// company, its currency, the supplier being bought from, today's date) is
/// passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub company: Option<CompanyId>,
    pub company_currency: Option<Currency>,
    pub supplier: Option<PartyId>,
    pub today: NaiveDate,
}

impl RequestContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            company: None,
            company_currency: None,
            supplier: None,
            today,
        }
    }

    pub fn with_company(mut self, company: CompanyId, currency: Currency) -> Self {
        self.company = Some(company);
        self.company_currency = Some(currency);
        self
    }

    pub fn with_supplier(mut self, supplier: PartyId) -> Self {
        self.supplier = Some(supplier);
        self
    }
}
