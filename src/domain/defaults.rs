use crate::domain::mapping::{
    AddressKind, FieldRule, LineItemMappingEntry, MappingEntry, MappingGroup, SanitizeOp,
    SourceField, ValueType, UNSET_TOKEN,
};

pub const ACCOUNT_GROUP: &str = "account";
pub const ORDER_GROUP: &str = "order";

/// 每次呼叫都回傳全新的值
pub fn default_account_mapping() -> Vec<MappingEntry> {
    vec![
        MappingEntry::new("Account Number", "accountNumber").required(),
        MappingEntry::new("Customer ID", "customerId"),
        MappingEntry::new("Delivery Sequence", "deliverySequence"),
        MappingEntry::new("Email", "emailAddress")
            .required()
            .with_email_validation()
            .with_sanitize(true)
            .with_operation(SanitizeOp::Trim)
            .with_operation(SanitizeOp::ToLowerCase),
        MappingEntry::new("Contact Number", "shippingAddress.contactNumber"),
    ]
}

pub fn default_order_mapping() -> Vec<MappingEntry> {
    vec![
        MappingEntry::new("Reference ID", "id").required(),
        MappingEntry::new("Purchase Order", "purchaseOrderReference")
            .required()
            .with_sanitize(true)
            .with_operation(SanitizeOp::Trim)
            .with_operation(SanitizeOp::ToUpperCase),
        MappingEntry::new("Order Date", "date").with_declared_type(ValueType::Date),
        MappingEntry::new("Payment Type", "paymentType"),
        MappingEntry::new("Order Total", "totalPriceWithGst")
            .required()
            .with_declared_type(ValueType::Number),
        MappingEntry::new("Freight", "freightCharge").with_declared_type(ValueType::Number),
        MappingEntry::new("GST", "gst").with_declared_type(ValueType::Number),
        MappingEntry::new("Delivery Address", SourceField::Address(AddressKind::Shipping)),
        MappingEntry::new("Invoice Address", SourceField::Address(AddressKind::Invoice)),
        MappingEntry::new("Pickup Address", UNSET_TOKEN),
        MappingEntry::new("Delivery Instructions", "deliveryInstructions"),
        MappingEntry::new("Order Note", "orderNote"),
    ]
}

pub fn default_line_item_mapping() -> Vec<LineItemMappingEntry> {
    vec![
        LineItemMappingEntry::new("sku", "sku").required(),
        LineItemMappingEntry::new("style", "style"),
        LineItemMappingEntry::new("quantity", "quantity")
            .required()
            .with_declared_type(ValueType::Number),
        LineItemMappingEntry::new("unitPrice", "unitPrice").with_declared_type(ValueType::Number),
        LineItemMappingEntry::new("variant", "variant"),
        LineItemMappingEntry::new("size", "size"),
    ]
}

/// 帳戶欄位在前、訂單欄位在後
pub fn default_mapping_groups() -> Vec<MappingGroup> {
    vec![
        MappingGroup::new(ACCOUNT_GROUP, default_account_mapping()),
        MappingGroup::new(ORDER_GROUP, default_order_mapping()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_defaults_have_unique_targets() {
        for group in default_mapping_groups() {
            let mut seen = HashSet::new();
            for entry in &group.entries {
                assert!(
                    seen.insert(entry.target_field.clone()),
                    "duplicate target '{}' in group '{}'",
                    entry.target_field,
                    group.name
                );
            }
        }
    }

    #[test]
    fn test_each_call_returns_fresh_values() {
        let mut first = default_order_mapping();
        first[0] = first[0].clone().with_literal_override("changed");

        let second = default_order_mapping();
        assert_eq!(second[0].literal_override, "");
    }

    #[test]
    fn test_email_entry_is_validated() {
        let account = default_account_mapping();
        let email = account.iter().find(|e| e.target_field == "Email").unwrap();
        assert!(email.email_validation);
        assert!(email.required);
    }
}
