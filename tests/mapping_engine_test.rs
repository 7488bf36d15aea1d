use erp_mapper::core::path::enumerate_paths;
use erp_mapper::core::transform::transform;
use erp_mapper::core::validator::validate;
use erp_mapper::domain::mapping::{
    FieldRule, LineItemMappingEntry, MappingEntry, MappingGroup, MappingSet, SanitizeOp,
};
use erp_mapper::MappingPlan;
use serde_json::json;

/// 一般訂單：驗證通過後轉換出 ERP 欄位與明細
#[test]
fn test_order_maps_reference_email_and_lines() {
    let document = json!({
        "id": "42",
        "purchaseOrderReference": "PO-9",
        "orderTotal": 19.5,
        "emailAddress": "a@b.com",
        "orderLines": [{"style": "S1", "sku": "K1", "quantity": 2, "unitPrice": 5}]
    });

    let entries = vec![
        MappingEntry::new("Reference ID", "id"),
        MappingEntry::new("Email", "emailAddress")
            .required()
            .with_email_validation(),
    ];
    let line_items = vec![LineItemMappingEntry::new("sku", "sku")];

    assert!(validate(&entries, &document).is_empty());

    let groups = vec![MappingGroup::new("order", entries)];
    let output = transform(&document, &groups, &line_items);
    assert_eq!(
        output,
        json!({"Reference ID": "42", "Email": "a@b.com", "LineItems": [{"sku": "K1"}]})
    );

    // 輸入保持不變
    assert_eq!(document["orderLines"][0]["style"], json!("S1"));
}

/// 每個項目都設了自訂值時，輸出只取決於自訂值
#[test]
fn test_overrides_on_every_entry_ignore_document() {
    let entries = MappingSet::new(vec![
        MappingEntry::new("Reference ID", "id"),
        MappingEntry::new("Purchase Order", "purchaseOrderReference")
            .with_sanitize(true)
            .with_operation(SanitizeOp::ToUpperCase),
        MappingEntry::new("Branch", "__empty__"),
    ]);
    let entries = entries
        .with_literal_override(0, "REF")
        .with_literal_override(1, "po-override")
        .with_literal_override(2, "AKL");

    // 自訂值會清掉清理步驟
    assert!(entries.get(1).map(|e| e.operations().is_empty()).unwrap_or(false));

    let groups = vec![MappingGroup::new("order", entries.into_entries())];
    let expected = json!({"Reference ID": "REF", "Purchase Order": "po-override", "Branch": "AKL"});

    for document in [
        json!({}),
        json!({"id": "42", "purchaseOrderReference": "PO-9"}),
        json!({"id": null, "purchaseOrderReference": 17}),
    ] {
        assert_eq!(transform(&document, &groups, &[]), expected);
    }
}

#[test]
fn test_default_plan_on_realistic_order() {
    let document = json!({
        "id": 1001,
        "accountNumber": "ACC-7",
        "emailAddress": "  Buyer@Example.COM ",
        "purchaseOrderReference": " po-77 ",
        "date": "2024-01-15",
        "totalPriceWithGst": 0,
        "shippingAddress": {
            "streetAddress": "1 Queen St",
            "city": "Auckland",
            "suburb": "",
            "postCode": 1010,
            "country": "NZ",
            "contactNumber": "021 555 0100"
        },
        "orderLines": [
            {"sku": "K1", "style": "S1", "quantity": 2, "unitPrice": 5},
            {"sku": "K2", "quantity": 1, "variant": "Blue"}
        ]
    });

    let plan = MappingPlan::defaults();
    assert!(plan.validate(&document).is_empty());

    let output = plan.transform(&document);
    assert_eq!(output["Account Number"], json!("ACC-7"));
    assert_eq!(output["Email"], json!("buyer@example.com"));
    assert_eq!(output["Reference ID"], json!(1001));
    assert_eq!(output["Purchase Order"], json!("PO-77"));
    assert_eq!(output["Order Total"], json!(0));
    assert_eq!(output["Contact Number"], json!("021 555 0100"));
    assert_eq!(output["Delivery Address"], json!("1 Queen St, Auckland, 1010, NZ"));
    assert_eq!(output["Invoice Address"], json!(""));
    assert!(output.get("Pickup Address").is_none());
    assert!(output.get("Freight").is_none());

    assert_eq!(
        output["LineItems"],
        json!([
            {"sku": "K1", "style": "S1", "quantity": 2, "unitPrice": 5},
            {"sku": "K2", "quantity": 1, "variant": "Blue"}
        ])
    );
}

#[test]
fn test_default_plan_rejects_bad_email() {
    let document = json!({"id": "1", "emailAddress": "nobody"});
    let errors = MappingPlan::defaults().validate(&document);
    assert_eq!(
        errors,
        vec!["Email: Source field \"emailAddress\" does not contain a valid email"]
    );
}

#[test]
fn test_enumerate_paths_for_source_picker() {
    let document = json!({
        "id": "42",
        "shippingAddress": {"city": "Auckland", "postCode": "1010"},
        "orderLines": [
            {"sku": "K1", "quantity": 2},
            {"sku": "K2", "quantity": 1, "extra": true}
        ],
        "tags": ["a", "b"],
        "emailAddress": "a@b.com"
    });

    assert_eq!(
        enumerate_paths(&document),
        vec![
            "id",
            "shippingAddress.city",
            "shippingAddress.postCode",
            "orderLines.sku",
            "orderLines.quantity",
            "tags",
            "emailAddress",
        ]
    );
}
