use cartbeacon_core::{Cart, CartLine, MemoryCatalog, Order, OrderLine, Product, ProductId};

pub const RUNNER: ProductId = ProductId(101);
pub const JACKET: ProductId = ProductId(102);
pub const JACKET_BLUE_M: ProductId = ProductId(1021);
pub const BOTTLE: ProductId = ProductId(103);
pub const DISCONTINUED: ProductId = ProductId(999);

pub fn demo_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_category(1, "Взуття", None)
        .with_category(2, "Бігові", Some(1))
        .with_category(3, "Одяг", None)
        .with_category(4, "Куртки", Some(3))
        .with_category(5, "Аксесуари", None)
        .with_product(
            Product::simple(101, "Trail Runner X", 3499.0).with_attribute("pa_brand", "Acme"),
            &[2, 1],
        )
        .with_product(
            Product::simple(102, "Storm Jacket", 2899.0).with_attribute("pa_brand", "Northline"),
            &[4, 3],
        )
        .with_product(
            Product::variation(
                1021,
                102,
                "Storm Jacket - Blue, M",
                2999.0,
                vec![
                    ("pa_color".to_string(), "Blue".to_string()),
                    ("pa_size".to_string(), "M".to_string()),
                ],
            ),
            &[],
        )
        .with_product(Product::simple(103, "Steel Bottle 0.75", 449.99), &[5])
}

pub fn shop_page() -> Vec<ProductId> {
    vec![RUNNER, DISCONTINUED, JACKET, BOTTLE]
}

pub fn cart_after_adds() -> Cart {
    Cart {
        lines: vec![
            CartLine {
                key: "c1".to_string(),
                product_id: JACKET,
                variation_id: Some(JACKET_BLUE_M),
                quantity: 1,
            },
            CartLine {
                key: "c2".to_string(),
                product_id: RUNNER,
                variation_id: None,
                quantity: 2,
            },
        ],
    }
}

pub fn bottle_line() -> CartLine {
    CartLine {
        key: "c3".to_string(),
        product_id: BOTTLE,
        variation_id: None,
        quantity: 1,
    }
}

pub fn order_from(cart: &Cart, id: u64, catalog: &MemoryCatalog) -> Order {
    use cartbeacon_core::Catalog;

    let lines: Vec<OrderLine> = cart
        .lines
        .iter()
        .map(|l| OrderLine {
            product_id: l.product_id,
            variation_id: l.variation_id,
            quantity: l.quantity,
            price: catalog
                .product(l.variation_id.unwrap_or(l.product_id))
                .and_then(|p| p.price)
                .unwrap_or(0.0),
        })
        .collect();
    let subtotal: f64 = lines.iter().map(|l| l.price * f64::from(l.quantity)).sum();
    let shipping = 120.0;

    Order {
        id,
        total: subtotal + shipping,
        tax: None,
        shipping: Some(shipping),
        coupon: None,
        lines,
    }
}
