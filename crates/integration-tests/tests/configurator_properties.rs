//! Contract properties of the configurator engine, checked end to end.

use configurator_engine::{Configuration, Product, SelectionState};
use rust_decimal::Decimal;
use serde_json::json;

fn product(value: serde_json::Value) -> Product {
    serde_json::from_value(value).expect("fixture should parse")
}

#[test]
fn test_bare_product_resolves_to_its_own_fields() {
    // Zero variants and addons: the engine answers with the product's own
    // stock and exactly the base price.
    let mug = product(json!({
        "id": 1, "name": "Mug", "basePrice": 15, "stock": 42
    }));
    let selection = SelectionState::new();
    let config = Configuration::new(&mug, &selection);
    assert_eq!(config.available_stock(), 42);
    assert_eq!(config.final_price().amount, Decimal::from(15));
    assert!(config.validate_required_variants().is_valid);
    assert!(config.validate_required_addons().is_valid);
}

#[test]
fn test_leaf_fields_count_nested_fields_ignored() {
    // The leaf option's stock/priceModifier are used. The nested option
    // carries garbage in its own fields, which the parser discards; only
    // its leaves matter.
    let chair = product(json!({
        "id": 2, "name": "Chair", "basePrice": 300,
        "variants": [{
            "name": "Frame",
            "options": [
                {"label": "Steel", "value": "steel", "priceModifier": 20, "stock": 9},
                {"label": "Wood", "value": "wood",
                 "priceModifier": -77777, "stock": 99999,
                 "subVariants": [{
                     "name": "Species",
                     "options": [{"label": "Birch", "value": "birch",
                                  "priceModifier": 40, "stock": 2}]
                 }]
                }
            ]
        }]
    }));

    let mut selection = SelectionState::new();
    selection
        .select_option(&chair, "Frame", "steel")
        .expect("steel exists");
    let config = Configuration::new(&chair, &selection);
    assert_eq!(config.available_stock(), 9);
    assert_eq!(config.final_price().amount, Decimal::from(320));

    let mut selection = SelectionState::new();
    selection
        .select_option(&chair, "Frame", "wood")
        .expect("wood exists");
    selection
        .select_sub_option(&chair, "Frame", "Species", "birch")
        .expect("birch exists");
    let config = Configuration::new(&chair, &selection);
    assert_eq!(config.available_stock(), 2, "garbage stock on non-leaf ignored");
    assert_eq!(
        config.final_price().amount,
        Decimal::from(340),
        "garbage modifier on non-leaf ignored"
    );
}

#[test]
fn test_auto_selection_is_idempotent() {
    let lamp = product(json!({
        "id": 3, "name": "Lamp", "basePrice": 200,
        "variants": [{
            "name": "Base",
            "options": [{
                "label": "Standard", "value": "std",
                "subVariants": [{
                    "name": "Bulb",
                    "options": [{"label": "Warm", "value": "warm", "stock": 6}]
                }]
            }]
        }]
    }));

    let mut selection = SelectionState::new();
    selection.auto_select(&lamp);
    let first = selection.clone();
    selection.auto_select(&lamp);
    selection.auto_select(&lamp);
    assert_eq!(selection, first);
}

#[test]
fn test_image_walks_up_the_chain_deterministically() {
    let base = json!({
        "id": 4, "name": "Frame", "basePrice": 80,
        "images": ["frame-default.jpg"],
        "variants": [{
            "name": "Wood",
            "options": [{
                "label": "Oak", "value": "oak", "image": "oak.jpg",
                "subVariants": [{
                    "name": "Stain",
                    "options": [{"label": "Dark", "value": "dark", "stock": 3,
                                 "image": "oak-dark.jpg"}]
                }]
            }]
        }]
    });

    // Deepest leaf image wins.
    let frame = product(base.clone());
    let mut selection = SelectionState::new();
    selection.select_option(&frame, "Wood", "oak").expect("oak");
    selection
        .select_sub_option(&frame, "Wood", "Stain", "dark")
        .expect("dark");
    let config = Configuration::new(&frame, &selection);
    assert_eq!(config.image().as_deref(), Some("oak-dark.jpg"));

    // Leaf without image falls back to the parent option's image.
    let mut no_leaf_image = base.clone();
    no_leaf_image["variants"][0]["options"][0]["subVariants"][0]["options"][0]
        .as_object_mut()
        .expect("option object")
        .remove("image");
    let frame = product(no_leaf_image);
    let config = Configuration::new(&frame, &selection);
    assert_eq!(config.image().as_deref(), Some("oak.jpg"));

    // No selected node carries an image: the default list wins.
    let mut bare = base;
    bare["variants"][0]["options"][0]
        .as_object_mut()
        .expect("option object")
        .remove("image");
    bare["variants"][0]["options"][0]["subVariants"][0]["options"][0]
        .as_object_mut()
        .expect("option object")
        .remove("image");
    let frame = product(bare);
    let config = Configuration::new(&frame, &selection);
    assert_eq!(config.image().as_deref(), Some("frame-default.jpg"));
}

#[test]
fn test_resolution_is_pure_and_repeatable() {
    let desk = product(json!({
        "id": 5, "name": "Desk", "basePrice": 1000,
        "variants": [{
            "name": "Color",
            "options": [{"label": "Blue", "value": "blue",
                         "priceModifier": 200, "stock": 3}]
        }]
    }));
    let mut selection = SelectionState::new();
    selection
        .select_option(&desk, "Color", "blue")
        .expect("blue exists");

    let config = Configuration::new(&desk, &selection);
    let before = selection.clone();
    for _ in 0..3 {
        assert_eq!(config.available_stock(), 3);
        assert_eq!(config.final_price().amount, Decimal::from(1200));
    }
    assert_eq!(*config.selection(), before, "resolution never mutates state");
}
