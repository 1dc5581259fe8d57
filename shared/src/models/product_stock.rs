//! Product stock model

use serde::{Deserialize, Serialize};

/// Stock record for one product class (SKU)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStock {
    pub product_class_id: i64,
    pub stock: i64,
    /// Unlimited stock is never reserved or released
    #[serde(default)]
    pub stock_unlimited: bool,
}

impl ProductStock {
    pub fn limited(product_class_id: i64, stock: i64) -> Self {
        Self {
            product_class_id,
            stock,
            stock_unlimited: false,
        }
    }

    pub fn unlimited(product_class_id: i64) -> Self {
        Self {
            product_class_id,
            stock: 0,
            stock_unlimited: true,
        }
    }
}
