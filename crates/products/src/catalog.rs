//! In-memory product catalog: templates and their variants.
//!
//! Variant-level computed fields are evaluated here, on read, from the
//! current state of the owning template.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use supplyerp_core::{Aggregate, DomainError, DomainResult};

use crate::product::{Product, ProductId};
use crate::template::{ProductTemplate, TemplateCommand, TemplateEvent, TemplateId};
use crate::uom::Uom;

/// Comparison operator of a boolean search clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClauseOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
}

impl ClauseOperator {
    fn test(self, value: bool, wanted: bool) -> bool {
        match self {
            ClauseOperator::Eq => value == wanted,
            ClauseOperator::NotEq => value != wanted,
        }
    }
}

/// A variant joined with its template.
#[derive(Debug, Clone, Copy)]
pub struct VariantView<'a> {
    product: &'a Product,
    template: &'a ProductTemplate,
}

impl<'a> VariantView<'a> {
    /// Join a variant with its template.
    pub fn new(product: &'a Product, template: &'a ProductTemplate) -> DomainResult<Self> {
        if product.template_id() != template.id_typed() {
            return Err(DomainError::invariant(format!(
                "product {} does not belong to template {}",
                product.id_typed(),
                template.id_typed()
            )));
        }
        Ok(Self { product, template })
    }

    pub fn product(&self) -> &'a Product {
        self.product
    }

    pub fn template(&self) -> &'a ProductTemplate {
        self.template
    }

    pub fn id(&self) -> ProductId {
        self.product.id_typed()
    }

    pub fn name(&self) -> &'a str {
        self.template.name()
    }

    pub fn rec_name(&self) -> String {
        match self.product.code() {
            Some(code) => format!("[{code}] {}", self.name()),
            None => self.name().to_string(),
        }
    }

    /// Whether the variant can be purchased; follows the template flag.
    pub fn purchasable_variant(&self) -> bool {
        self.template.purchasable()
    }

    pub fn default_uom(&self) -> Option<&'a Uom> {
        self.template.default_uom()
    }

    pub fn purchase_uom(&self) -> Option<&'a Uom> {
        self.template.purchase_uom()
    }
}

/// Templates and variants, variants kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    templates: HashMap<TemplateId, ProductTemplate>,
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a created template.
    pub fn insert_template(&mut self, template: ProductTemplate) -> DomainResult<()> {
        if !template.is_created() {
            return Err(DomainError::validation("template has not been created"));
        }
        if self.templates.contains_key(&template.id_typed()) {
            return Err(DomainError::conflict("template already registered"));
        }
        self.templates.insert(template.id_typed(), template);
        Ok(())
    }

    /// Register a variant; its template must already be known.
    pub fn insert_product(&mut self, product: Product) -> DomainResult<()> {
        if !self.templates.contains_key(&product.template_id()) {
            return Err(DomainError::validation("product template is required"));
        }
        if self.index.contains_key(&product.id_typed()) {
            return Err(DomainError::conflict("product already registered"));
        }
        self.index.insert(product.id_typed(), self.products.len());
        self.products.push(product);
        Ok(())
    }

    /// Run a command against a registered template.
    pub fn update_template(
        &mut self,
        template_id: TemplateId,
        command: &TemplateCommand,
    ) -> DomainResult<Vec<TemplateEvent>> {
        let template = self
            .templates
            .get_mut(&template_id)
            .ok_or_else(DomainError::not_found)?;
        template.execute(command)
    }

    pub fn template(&self, template_id: TemplateId) -> Option<&ProductTemplate> {
        self.templates.get(&template_id)
    }

    pub fn variant(&self, product_id: ProductId) -> DomainResult<VariantView<'_>> {
        let product = self
            .index
            .get(&product_id)
            .map(|&i| &self.products[i])
            .ok_or_else(DomainError::not_found)?;
        self.view(product)
    }

    pub fn purchasable_variant(&self, product_id: ProductId) -> DomainResult<bool> {
        Ok(self.variant(product_id)?.purchasable_variant())
    }

    /// Variants whose `purchasable_variant` satisfies `operator value`.
    ///
    /// The predicate is evaluated against the template flag.
    pub fn search_purchasable_variant(
        &self,
        operator: ClauseOperator,
        value: bool,
    ) -> Vec<VariantView<'_>> {
        self.products
            .iter()
            .filter_map(|product| {
                let template = self.templates.get(&product.template_id())?;
                operator
                    .test(template.purchasable(), value)
                    .then_some(VariantView { product, template })
            })
            .collect()
    }

    fn view<'a>(&'a self, product: &'a Product) -> DomainResult<VariantView<'a>> {
        let template = self
            .templates
            .get(&product.template_id())
            .ok_or_else(|| DomainError::invariant("product template is missing"))?;
        Ok(VariantView { product, template })
    }
}
