use serde::{Deserialize, Serialize};

use supplyerp_core::{Entity, typed_id};

use crate::template::TemplateId;

typed_id!(
    /// Product (variant) identifier.
    ProductId
);

/// A product variant: the concrete item that is bought and stocked.
///
/// Name, units and flags live on the template; read them through
/// [`crate::VariantView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    template: TemplateId,
    code: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, template: TemplateId) -> Self {
        Self {
            id,
            template,
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.code = if code.trim().is_empty() { None } else { Some(code) };
        self
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn template_id(&self) -> TemplateId {
        self.template
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
