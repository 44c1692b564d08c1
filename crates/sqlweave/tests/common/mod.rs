//! Shared table fixtures, shaped like generated schema declarations.

#![allow(dead_code)]

use sqlweave::{ForeignKey, JoinGraph};

sqlweave::define_table! {
    /// `account`
    pub struct Account => "account" {
        id: i64 => "id",
        uuid: String => "uuid",
        kind: String => "type",
        created_ts: i64 => "created_ts",
    }
}

sqlweave::define_table! {
    /// `shopping_cart`
    pub struct ShoppingCart => "shopping_cart" {
        id: i64 => "id",
        uuid: String => "uuid",
        owner_id: i64 => "owner_id",
    }
}

sqlweave::define_table! {
    /// `cart_item`
    pub struct CartItem => "cart_item" {
        id: i64 => "id",
        cart_id: i64 => "cart_id",
        sku: String => "sku",
        price: f64 => "price",
    }
}

sqlweave::define_table! {
    /// `config`
    pub struct Config => "config" {
        uuid: String => "uuid",
    }
}

/// Foreign keys between the fixture tables
pub fn foreign_keys() -> Vec<ForeignKey> {
    vec![
        ForeignKey::new("shopping_cart", "owner_id", "account", "id"),
        ForeignKey::new("cart_item", "cart_id", "shopping_cart", "id"),
    ]
}

/// Join graph over the fixture tables
pub fn schema_graph() -> JoinGraph {
    JoinGraph::from_foreign_keys(&foreign_keys())
}
