//! End-to-end purchasing scenario: a catalog with two variants of one template,
//! each bought from its own suppliers at its own prices.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use supplyerp_core::{Aggregate, CompanyId, Currency};
use supplyerp_parties::{Party, PartyId};
use supplyerp_products::{
    ClauseOperator, CreateTemplate, Product, ProductCatalog, ProductId, ProductTemplate,
    SetPurchasable, TemplateCommand, TemplateId, Uom, UomCategoryId, UomId,
};
use supplyerp_purchasing::{
    AddPrice, CreateProductSupplier, HasSuppliers, PriceSource, ProductSupplier,
    ProductSupplierCommand, ProductSupplierId, ProductSupplierPriceId, RequestContext,
    SuppliedVariant, select_offer, select_price_break,
};

struct World {
    catalog: ProductCatalog,
    template_id: TemplateId,
    red: ProductId,
    blue: ProductId,
    unit: Uom,
    acme: Party,
    globex: Party,
    ctx: RequestContext,
}

fn world() -> World {
    supplyerp_observability::init_for_tests();

    let unit = Uom::new(UomId::generate(), UomCategoryId::generate(), "Unit", "u", 1.0, 1.0)
        .expect("unit");
    let template_id = TemplateId::generate();
    let mut template = ProductTemplate::empty(template_id);
    template
        .execute(&TemplateCommand::CreateTemplate(CreateTemplate {
            template_id,
            name: "T-Shirt".to_string(),
            purchasable: true,
            default_uom: unit.clone(),
            purchase_uom: None,
            cost_price: Decimal::new(4, 0),
            occurred_at: Utc::now(),
        }))
        .expect("template");

    let mut catalog = ProductCatalog::new();
    catalog.insert_template(template).expect("insert template");
    let red = Product::new(ProductId::generate(), template_id).with_code("TS-RED");
    let blue = Product::new(ProductId::generate(), template_id).with_code("TS-BLUE");
    let (red_id, blue_id) = (red.id_typed(), blue.id_typed());
    catalog.insert_product(red).expect("insert red");
    catalog.insert_product(blue).expect("insert blue");

    World {
        catalog,
        template_id,
        red: red_id,
        blue: blue_id,
        unit,
        acme: Party::new(PartyId::generate(), "Acme").expect("acme"),
        globex: Party::new(PartyId::generate(), "Globex").expect("globex"),
        ctx: RequestContext::new(NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"))
            .with_company(CompanyId::new(), Currency::new("EUR", 2).expect("currency")),
    }
}

fn offer(
    w: &World,
    product: ProductId,
    party: &Party,
    sequence: Option<i32>,
    delivery_time: Option<u32>,
    breaks: &[(f64, Decimal)],
) -> ProductSupplier {
    let supplier_id = ProductSupplierId::generate();
    let mut supplier = ProductSupplier::empty(supplier_id);
    let purchase_uom = w
        .catalog
        .variant(product)
        .expect("variant")
        .purchase_uom()
        .cloned();
    supplier
        .execute(&ProductSupplierCommand::CreateProductSupplier(
            CreateProductSupplier {
                supplier_id,
                product: Some(product),
                purchase_uom,
                party: Some(party.id_typed()),
                company: None,
                currency: None,
                name: None,
                code: Some(format!("{}-{}", party.name().to_uppercase(), sequence.unwrap_or(0))),
                sequence,
                delivery_time,
                context: w.ctx.clone(),
                occurred_at: Utc::now(),
            },
        ))
        .expect("create supplier");
    for &(quantity, unit_price) in breaks {
        supplier
            .execute(&ProductSupplierCommand::AddPrice(
                AddPrice::new(
                    supplier_id,
                    ProductSupplierPriceId::generate(),
                    unit_price,
                    Utc::now(),
                )
                .from_quantity(quantity),
            ))
            .expect("add price");
    }
    supplier
}

#[test]
fn variants_are_priced_from_their_own_suppliers() {
    let w = world();

    let mut red = SuppliedVariant::new(w.catalog.variant(w.red).expect("red"));
    red.add_supplier(offer(
        &w,
        w.red,
        &w.acme,
        Some(1),
        Some(5),
        &[(0.0, Decimal::new(10, 0)), (100.0, Decimal::new(8, 0))],
    ))
    .expect("attach");

    let mut blue = SuppliedVariant::new(w.catalog.variant(w.blue).expect("blue"));
    blue.add_supplier(offer(
        &w,
        w.blue,
        &w.globex,
        None,
        None,
        &[(0.0, Decimal::new(12, 0))],
    ))
    .expect("attach");

    let price = red
        .purchase_price(150.0, &w.unit, &w.ctx)
        .expect("price")
        .expect("some price");
    assert_eq!(price.unit_price, Decimal::new(8, 0));
    assert_eq!(price.currency.code(), "EUR");

    let price = red
        .purchase_price(50.0, &w.unit, &w.ctx)
        .expect("price")
        .expect("some price");
    assert_eq!(price.unit_price, Decimal::new(10, 0));

    let price = blue
        .purchase_price(150.0, &w.unit, &w.ctx)
        .expect("price")
        .expect("some price");
    assert_eq!(price.unit_price, Decimal::new(12, 0));

    // Buying red from Globex: no offer, template cost applies.
    let ctx = w.ctx.clone().with_supplier(w.globex.id_typed());
    let price = red
        .purchase_price(150.0, &w.unit, &ctx)
        .expect("price")
        .expect("some price");
    assert_eq!(price.source, PriceSource::Template);
    assert_eq!(price.unit_price, Decimal::new(4, 0));
}

#[test]
fn lead_times_drive_supply_and_purchase_dates() {
    let w = world();
    let fast = offer(&w, w.red, &w.acme, Some(2), Some(5), &[]);
    let unknown = offer(&w, w.red, &w.globex, Some(1), None, &[]);

    let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).expect("date");
    assert_eq!(fast.compute_supply_date(Some(day(1, 1)), &w.ctx), day(1, 6));
    assert_eq!(fast.compute_purchase_date(day(1, 10), &w.ctx), day(1, 5));
    assert_eq!(unknown.compute_supply_date(Some(day(1, 1)), &w.ctx), NaiveDate::MAX);
    assert_eq!(unknown.compute_purchase_date(day(1, 10), &w.ctx), w.ctx.today);

    let mut red = SuppliedVariant::new(w.catalog.variant(w.red).expect("red"));
    red.add_supplier(unknown).expect("attach");
    red.add_supplier(fast).expect("attach");
    assert_eq!(red.supply_date(&w.ctx), day(3, 6));

    // The unknown-lead-time supplier still comes first by sequence.
    let first = red.product_suppliers_used(&ProductSupplier::get_pattern(&w.ctx))[0];
    assert_eq!(first.party(), Some(w.globex.id_typed()));
}

#[test]
fn matcher_works_on_plain_offer_lists() {
    let w = world();
    let offers = vec![
        offer(&w, w.blue, &w.acme, None, None, &[(0.0, Decimal::new(3, 0))]),
        offer(&w, w.red, &w.globex, Some(3), None, &[(0.0, Decimal::new(6, 0))]),
        offer(&w, w.red, &w.acme, Some(1), None, &[(10.0, Decimal::new(5, 0))]),
    ];
    let pattern = ProductSupplier::get_pattern(&w.ctx);

    let chosen = select_offer(&offers, w.red, &pattern).expect("offer");
    assert_eq!(chosen.party(), Some(w.acme.id_typed()));

    // Below the only break of the chosen offer: no price, not an error.
    let price = select_price_break(chosen, 5.0, &w.unit, &pattern).expect("select");
    assert!(price.is_none());

    let variant = w.catalog.variant(w.red).expect("red");
    assert_eq!(
        chosen.supplier_name(&variant).expect("own product"),
        Some("[ACME-1] T-Shirt".to_string())
    );
    assert_eq!(
        chosen.rec_name(&variant, &w.acme).expect("own party"),
        "[TS-RED] T-Shirt @ Acme"
    );
    assert!(chosen.rec_name(&variant, &w.globex).is_err());
}

#[test]
fn unpurchasable_template_hides_variants_from_search() {
    let mut w = world();
    assert_eq!(
        w.catalog
            .search_purchasable_variant(ClauseOperator::Eq, true)
            .len(),
        2
    );

    w.catalog
        .update_template(
            w.template_id,
            &TemplateCommand::SetPurchasable(SetPurchasable {
                template_id: w.template_id,
                purchasable: false,
                occurred_at: Utc::now(),
            }),
        )
        .expect("update");

    assert!(!w.catalog.purchasable_variant(w.red).expect("red"));
    assert!(
        w.catalog
            .search_purchasable_variant(ClauseOperator::Eq, true)
            .is_empty()
    );
    assert_eq!(
        w.catalog
            .search_purchasable_variant(ClauseOperator::Eq, false)
            .len(),
        2
    );
}
