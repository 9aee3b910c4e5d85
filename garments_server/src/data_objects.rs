use std::fmt::Display;

use garments_engine::db_types::{Account, NewOrder, OrderStatusType, ProductId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    /// The same token that is set in the `gt_access_token` cookie, for clients that prefer to send it as a header.
    pub access_token: String,
    pub account: Account,
}

/// The body of a new order. The buyer is always the authenticated caller, so there is no email field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderRequest {
    pub fn into_new_order(self, user_email: &str) -> NewOrder {
        NewOrder {
            product_id: self.product_id,
            quantity: self.quantity,
            user_email: user_email.to_string(),
            delivery_address: self.delivery_address,
            contact_number: self.contact_number,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestockRequest {
    pub amount: i64,
}
