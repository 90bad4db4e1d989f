use serde::{Deserialize, Serialize};

use crate::pricing::{LineItem, QuoteBreakdown};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub notes: String,
}

/// Service selections for one estimate. Mowing is the area-priced line;
/// shrubs and cleanup are flat fees quoted per visit.
#[derive(Debug, Clone, Deserialize)]
pub struct Services {
    #[serde(default = "default_mowing")]
    pub mowing: bool,
    #[serde(default)]
    pub shrubs: bool,
    #[serde(default)]
    pub shrub_price: f64,
    #[serde(default)]
    pub cleanup: bool,
    #[serde(default)]
    pub cleanup_price: f64,
}

fn default_mowing() -> bool {
    true
}

impl Default for Services {
    fn default() -> Self {
        Services {
            mowing: true,
            shrubs: false,
            shrub_price: 0.0,
            cleanup: false,
            cleanup_price: 0.0,
        }
    }
}

impl Services {
    /// Active flat-fee lines, in the order they appear on the estimate.
    pub fn flat_fees(&self) -> Vec<LineItem> {
        let mut items = Vec::new();
        if self.shrubs {
            items.push(LineItem {
                label: "Shrub Trimming".to_string(),
                price: self.shrub_price,
            });
        }
        if self.cleanup {
            items.push(LineItem {
                label: "Lawn Clean-up".to_string(),
                price: self.cleanup_price,
            });
        }
        items
    }
}

/// The durable row inserted into the remote `estimates` table. Field names
/// match the table columns; inactive services store a 0 price.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateRecord {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub lawn_area: u64,
    pub notes: String,
    pub rate_used: f64,
    pub shrub_price: f64,
    pub cleanup_price: f64,
    pub final_price: f64,
}

impl EstimateRecord {
    pub fn new(
        customer: &Customer,
        services: &Services,
        lawn_area: u64,
        rate_used: f64,
        quote: &QuoteBreakdown,
    ) -> Self {
        EstimateRecord {
            name: customer.name.clone(),
            address: customer.address.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            lawn_area,
            notes: customer.notes.clone(),
            rate_used,
            shrub_price: if services.shrubs { services.shrub_price } else { 0.0 },
            cleanup_price: if services.cleanup { services.cleanup_price } else { 0.0 },
            final_price: quote.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::price_quote;

    #[test]
    fn inactive_services_store_zero_prices() {
        let customer = Customer {
            name: "Pat Doyle".to_string(),
            address: "12 Ocean Dr".to_string(),
            ..Default::default()
        };
        let services = Services {
            mowing: true,
            shrubs: true,
            shrub_price: 40.0,
            cleanup: false,
            cleanup_price: 99.0, // left over in the form, but cleanup is off
        };
        let quote = price_quote(10_000, 0.02, true, &services.flat_fees(), 50.0);
        let record = EstimateRecord::new(&customer, &services, 10_000, 0.02, &quote);

        assert_eq!(record.lawn_area, 10_000);
        assert_eq!(record.shrub_price, 40.0);
        assert_eq!(record.cleanup_price, 0.0);
        assert_eq!(record.final_price, 240.0);
    }
}
