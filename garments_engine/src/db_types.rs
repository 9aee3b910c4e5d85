use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gt_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------     Record ids       ---------------------------------------------------------
macro_rules! record_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim_start_matches('#')
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|e| ConversionError(format!("{s} is not a valid id. {e}")))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

record_id!(AccountId, "account");
record_id!(ProductId, "product");
record_id!(OrderId, "order");

//--------------------------------------        Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administers the account directory and sees the analytics.
    Admin,
    /// Publishes products, restocks them and records tracking events.
    Manager,
    /// Browses the catalog and places orders.
    #[default]
    Buyer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Buyer => write!(f, "buyer"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "buyer" => Ok(Self::Buyer),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------    AccountStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Pending,
    Approved,
    Suspended,
}

impl Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Pending => write!(f, "pending"),
            AccountStatus::Approved => write!(f, "approved"),
            AccountStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl FromStr for AccountStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "suspended" => Ok(Self::Suspended),
            s => Err(ConversionError(format!("Invalid account status: {s}"))),
        }
    }
}

//--------------------------------------       Account        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_suspended(&self) -> bool {
        self.status == AccountStatus::Suspended
    }
}

//--------------------------------------      NewAccount      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl NewAccount {
    pub fn new<S: Into<String>>(email: S, role: Role) -> Self {
        Self { email: email.into(), name: String::default(), photo_url: None, role }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_photo_url<S: Into<String>>(mut self, url: S) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Administrators are approved on registration. Everyone else waits for an administrator.
    pub fn initial_status(&self) -> AccountStatus {
        match self.role {
            Role::Admin => AccountStatus::Approved,
            Role::Manager | Role::Buyer => AccountStatus::Pending,
        }
    }
}

//--------------------------------------    AccountUpdate     ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.status.is_none()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }
}

//--------------------------------------       Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Cents,
    /// Units available for ordering. Never negative.
    pub quantity: i64,
    pub minimum_order: i64,
    pub images: Json<Vec<String>>,
    pub payment_options: Option<String>,
    pub show_on_home: bool,
    pub rating: Option<f64>,
    pub location: Option<String>,
    /// Email of the account that published the product.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewProduct      ---------------------------------------------------------
fn default_minimum_order() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Cents,
    pub quantity: i64,
    #[serde(default = "default_minimum_order")]
    pub minimum_order: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub payment_options: Option<String>,
    #[serde(default)]
    pub show_on_home: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Cents, quantity: i64) -> Self {
        Self {
            name: name.into(),
            description: String::default(),
            category: String::default(),
            price,
            quantity,
            minimum_order: default_minimum_order(),
            images: vec![],
            payment_options: None,
            show_on_home: false,
            rating: None,
            location: None,
        }
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_minimum_order(mut self, minimum_order: i64) -> Self {
        self.minimum_order = minimum_order;
        self
    }

    pub fn on_home_page(mut self) -> Self {
        self.show_on_home = true;
        self
    }

    /// Checks the field constraints that the store would otherwise reject with a less helpful message.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name cannot be empty".into());
        }
        if self.price.is_negative() {
            return Err(format!("Product price cannot be negative. Got {}", self.price));
        }
        if self.quantity < 0 {
            return Err(format!("Product quantity cannot be negative. Got {}", self.quantity));
        }
        if self.minimum_order < 1 {
            return Err(format!("Minimum order must be at least 1. Got {}", self.minimum_order));
        }
        Ok(())
    }
}

//--------------------------------------    ProductUpdate     ---------------------------------------------------------
/// A catalog edit. Stock levels are deliberately absent: they only change through orders and restocking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Cents>,
    pub minimum_order: Option<i64>,
    pub images: Option<Vec<String>>,
    pub payment_options: Option<String>,
    pub show_on_home: Option<bool>,
    pub rating: Option<f64>,
    pub location: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.minimum_order.is_none()
            && self.images.is_none()
            && self.payment_options.is_none()
            && self.show_on_home.is_none()
            && self.rating.is_none()
            && self.location.is_none()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_price(mut self, price: Cents) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_show_on_home(mut self, show: bool) -> Self {
        self.show_on_home = Some(show);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Product name cannot be empty".into());
        }
        if matches!(self.price, Some(p) if p.is_negative()) {
            return Err("Product price cannot be negative".into());
        }
        if matches!(self.minimum_order, Some(m) if m < 1) {
            return Err("Minimum order must be at least 1".into());
        }
        Ok(())
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been placed and its stock reserved.
    #[default]
    Pending,
    /// A manager has accepted the order.
    Approved,
    Shipped,
    Delivered,
    /// Terminal. The reserved stock has been returned to the product.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Approved => write!(f, "approved"),
            OrderStatusType::Shipped => write!(f, "shipped"),
            OrderStatusType::Delivered => write!(f, "delivered"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Weak reference. The product may since have been deleted.
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Cents,
    pub total_price: Cents,
    pub user_email: String,
    pub status: OrderStatusType,
    pub delivery_address: Option<String>,
    pub contact_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub tracking: Vec<TrackingEvent>,
}

impl Order {
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatusType::Cancelled
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: ProductId,
    pub quantity: i64,
    /// The email of the buyer placing the order
    pub user_email: String,
    pub delivery_address: Option<String>,
    pub contact_number: Option<String>,
    pub notes: Option<String>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(product_id: ProductId, quantity: i64, user_email: S) -> Self {
        Self {
            product_id,
            quantity,
            user_email: user_email.into(),
            delivery_address: None,
            contact_number: None,
            notes: None,
        }
    }

    pub fn with_delivery_address<S: Into<String>>(mut self, address: S) -> Self {
        self.delivery_address = Some(address.into());
        self
    }

    pub fn with_contact_number<S: Into<String>>(mut self, number: S) -> Self {
        self.contact_number = Some(number.into());
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

//--------------------------------------    TrackingEvent     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: i64,
    pub order_id: OrderId,
    /// Free-text label, e.g. "Picked up by courier". Not related to the order status.
    pub status: String,
    pub location: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTrackingEvent {
    pub status: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl NewTrackingEvent {
    pub fn new<S: Into<String>>(status: S) -> Self {
        Self { status: status.into(), location: None, note: None }
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }
}
