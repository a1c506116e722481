use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyerp_core::{Aggregate, AggregateRoot, DomainError, typed_id};
use supplyerp_events::Event;

use crate::uom::Uom;

typed_id!(
    /// Product template identifier.
    TemplateId
);

/// Aggregate root: ProductTemplate.
///
/// The template holds what all of its variants share. Variant-level computed
/// fields (e.g. whether a variant is purchasable) are read through it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTemplate {
    id: TemplateId,
    name: String,
    purchasable: bool,
    default_uom: Option<Uom>,
    purchase_uom: Option<Uom>,
    cost_price: Decimal,
    version: u64,
    created: bool,
}

impl ProductTemplate {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: TemplateId) -> Self {
        Self {
            id,
            name: String::new(),
            purchasable: false,
            default_uom: None,
            purchase_uom: None,
            cost_price: Decimal::ZERO,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purchasable(&self) -> bool {
        self.purchasable
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Unit the template is stocked and costed in.
    pub fn default_uom(&self) -> Option<&Uom> {
        self.default_uom.as_ref()
    }

    /// Unit suppliers quote in; falls back to the default unit.
    pub fn purchase_uom(&self) -> Option<&Uom> {
        self.purchase_uom.as_ref().or(self.default_uom.as_ref())
    }

    /// Cost price per default unit.
    pub fn cost_price(&self) -> Decimal {
        self.cost_price
    }
}

impl AggregateRoot for ProductTemplate {
    type Id = TemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateTemplate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub template_id: TemplateId,
    pub name: String,
    pub purchasable: bool,
    pub default_uom: Uom,
    pub purchase_uom: Option<Uom>,
    pub cost_price: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetPurchasable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPurchasable {
    pub template_id: TemplateId,
    pub purchasable: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateCommand {
    CreateTemplate(CreateTemplate),
    SetPurchasable(SetPurchasable),
}

/// Event: TemplateCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCreated {
    pub template_id: TemplateId,
    pub name: String,
    pub purchasable: bool,
    pub default_uom: Uom,
    pub purchase_uom: Option<Uom>,
    pub cost_price: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PurchasableChanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasableChanged {
    pub template_id: TemplateId,
    pub purchasable: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateEvent {
    TemplateCreated(TemplateCreated),
    PurchasableChanged(PurchasableChanged),
}

impl Event for TemplateEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TemplateEvent::TemplateCreated(_) => "products.template.created",
            TemplateEvent::PurchasableChanged(_) => "products.template.purchasable_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TemplateEvent::TemplateCreated(e) => e.occurred_at,
            TemplateEvent::PurchasableChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ProductTemplate {
    type Command = TemplateCommand;
    type Event = TemplateEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TemplateEvent::TemplateCreated(e) => {
                self.id = e.template_id;
                self.name = e.name.clone();
                self.purchasable = e.purchasable;
                self.default_uom = Some(e.default_uom.clone());
                self.purchase_uom = e.purchase_uom.clone();
                self.cost_price = e.cost_price;
                self.created = true;
            }
            TemplateEvent::PurchasableChanged(e) => {
                self.purchasable = e.purchasable;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TemplateCommand::CreateTemplate(cmd) => self.handle_create(cmd),
            TemplateCommand::SetPurchasable(cmd) => self.handle_set_purchasable(cmd),
        }
    }
}

impl ProductTemplate {
    fn ensure_template_id(&self, template_id: TemplateId) -> Result<(), DomainError> {
        if self.id != template_id {
            return Err(DomainError::invariant("template_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateTemplate) -> Result<Vec<TemplateEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("template already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if cmd.cost_price.is_sign_negative() {
            return Err(DomainError::validation("cost price cannot be negative"));
        }

        // Suppliers may quote in another unit, but it must be convertible.
        if let Some(purchase_uom) = &cmd.purchase_uom {
            if purchase_uom.category() != cmd.default_uom.category() {
                return Err(DomainError::validation(
                    "purchase unit must be in the same category as the default unit",
                ));
            }
        }

        Ok(vec![TemplateEvent::TemplateCreated(TemplateCreated {
            template_id: cmd.template_id,
            name: cmd.name.clone(),
            purchasable: cmd.purchasable,
            default_uom: cmd.default_uom.clone(),
            purchase_uom: cmd.purchase_uom.clone(),
            cost_price: cmd.cost_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_purchasable(
        &self,
        cmd: &SetPurchasable,
    ) -> Result<Vec<TemplateEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_template_id(cmd.template_id)?;

        if self.purchasable == cmd.purchasable {
            return Ok(Vec::new());
        }

        Ok(vec![TemplateEvent::PurchasableChanged(PurchasableChanged {
            template_id: cmd.template_id,
            purchasable: cmd.purchasable,
            occurred_at: cmd.occurred_at,
        })])
    }
}
