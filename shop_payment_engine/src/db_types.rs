use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
pub use spg_common::Vnd;
use thiserror::Error;

//--------------------------------------      OrderStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created and no payment has been confirmed yet.
    Pending,
    /// Payment has been confirmed and the order is awaiting fulfilment.
    Processing,
    /// The payment failed, expired, or was abandoned by the customer. Terminal.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------       OrderCode       -------------------------------------------------------
/// The short, unique code correlating an order with the payment gateway. System-generated at checkout; the string
/// form is the lookup key on our side even when the gateway is handed a derived numeric key.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderCode(pub String);

impl FromStr for OrderCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------         Role          -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

pub type Roles = Vec<Role>;

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" | "user" => Ok(Self::User),
            "Admin" | "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------       Product         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Vnd,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------         Cart          -------------------------------------------------------
/// The per-user cart header. At most one exists per user; it is created lazily on the first add.
#[derive(Debug, Clone, FromRow)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       CartLine        -------------------------------------------------------
/// A cart line joined with its product's display name. `unit_price` is the snapshot taken when the line was added or
/// last updated; it is never re-read live at checkout.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Vnd,
}

impl CartLine {
    pub fn subtotal(&self) -> Vnd {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Computed once at creation from the order lines, never recomputed afterwards.
    pub total_amount: Vnd,
    pub status: OrderStatus,
    pub order_code: Option<OrderCode>,
    pub payment_link: Option<String>,
    pub transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

//--------------------------------------      OrderItem        -------------------------------------------------------
/// An immutable snapshot of a cart line at the moment of order creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Vnd,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub total_amount: Vnd,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Vnd,
}

impl NewOrder {
    /// Builds a pending order from the cart lines loaded at the start of checkout. Prices and quantities are copied
    /// from the lines, and the total is the sum of the line subtotals.
    pub fn from_cart_lines(user_id: i64, lines: &[CartLine]) -> Self {
        let total_amount = lines.iter().map(CartLine::subtotal).sum();
        let items = lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();
        Self { user_id, total_amount, items }
    }
}
